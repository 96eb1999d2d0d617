pub mod mesher;
