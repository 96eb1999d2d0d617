pub mod compositor;
pub mod timeline;
