use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn proportional_height_rounds_and_floors_at_one() {
    assert_eq!(target_dimensions(4, 4, 4, None).unwrap(), (4, 4));
    assert_eq!(target_dimensions(200, 100, 56, None).unwrap(), (56, 28));
    assert_eq!(target_dimensions(3, 2, 4, None).unwrap(), (4, 3));
    assert_eq!(target_dimensions(100, 1, 10, None).unwrap(), (10, 1));
    assert_eq!(target_dimensions(1000, 1, 10, None).unwrap(), (10, 1));
}

#[test]
fn explicit_height_wins() {
    assert_eq!(target_dimensions(4, 4, 4, Some(8)).unwrap(), (4, 8));
    assert_eq!(target_dimensions(4, 4, 4, Some(0)).unwrap(), (4, 4));
}

#[test]
fn zero_source_dimensions_are_invalid() {
    assert!(matches!(
        target_dimensions(0, 4, 4, None),
        Err(PixcelError::InvalidDimensions)
    ));
    assert!(matches!(
        scale_grid(&PixelGrid::transparent(0, 0), 1, 1, Scaler::Nearest),
        Err(PixcelError::InvalidDimensions)
    ));
}

#[test]
fn nearest_scaling_keeps_solid_colors() {
    let src = PixelGrid::filled(3, 3, Rgba8::new(12, 34, 56, 255));
    let out = scale_grid(&src, 7, 5, Scaler::Nearest).unwrap();
    assert_eq!(out, PixelGrid::filled(7, 5, Rgba8::new(12, 34, 56, 255)));
}

#[test]
fn scaler_names_are_lenient() {
    assert_eq!(Scaler::from_name("CatmullRom"), Scaler::CatmullRom);
    assert_eq!(Scaler::from_name("bilinear"), Scaler::Bilinear);
    assert_eq!(Scaler::from_name("approxbilinear"), Scaler::ApproxBilinear);
    assert_eq!(Scaler::from_name("nearest"), Scaler::Nearest);
    assert_eq!(Scaler::from_name("unknown"), Scaler::Nearest);
}
