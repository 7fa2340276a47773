//! Whole-cloud operations: centroid and index extraction

use cloudlib_core::{Error, Point, PointCloud, Result};

/// Mean position of all points in the cloud
///
/// # Example
/// ```rust
/// use cloudlib_core::{PointCloud, Point};
/// use cloudlib_algorithms::centroid;
///
/// let cloud = PointCloud::from_points(vec![
///     Point::new(1.0, 2.0, 3.0),
///     Point::new(3.0, 4.0, 5.0),
/// ]);
/// assert_eq!(centroid(&cloud).unwrap(), Point::new(2.0, 3.0, 4.0));
/// ```
pub fn centroid(cloud: &PointCloud) -> Result<Point> {
    if cloud.is_empty() {
        return Err(Error::InvalidData(
            "cannot compute the centroid of an empty cloud".to_string(),
        ));
    }

    let sum: Point = cloud.iter().sum();
    Ok(sum / cloud.len() as f32)
}

/// Copy the points at `indices`, in index order, into a new cloud
///
/// The result keeps the source name but is always unorganized, since an
/// arbitrary index subset no longer forms a grid.
pub fn extract_indices(cloud: &PointCloud, indices: &[usize]) -> Result<PointCloud> {
    let mut extracted = PointCloud::with_capacity(indices.len());
    if let Some(name) = cloud.name() {
        extracted.set_name(name);
    }

    for &index in indices {
        extracted.push(*cloud.at(index)?);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid_two_points() {
        let cloud = PointCloud::from_points(vec![
            Point::new(1.0, 2.0, 3.0),
            Point::new(3.0, 4.0, 5.0),
        ]);
        let c = centroid(&cloud).unwrap();
        assert_eq!(c.to_array(), [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_centroid_of_cube_corners() {
        let cloud: PointCloud = (0..8)
            .map(|i| Point::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32))
            .collect();
        let c = centroid(&cloud).unwrap();
        assert_relative_eq!(c.x, 0.5);
        assert_relative_eq!(c.y, 0.5);
        assert_relative_eq!(c.z, 0.5);
    }

    #[test]
    fn test_centroid_empty_cloud() {
        assert!(matches!(centroid(&PointCloud::new()), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_extract_indices() {
        let mut cloud = PointCloud::organized(2, 2);
        cloud.set_name("scan");
        for i in 0..4 {
            cloud.push(Point::new(i as f32, 0.0, 0.0));
        }

        let subset = extract_indices(&cloud, &[3, 0, 3]).unwrap();
        let xs: Vec<f32> = subset.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 0.0, 3.0]);
        assert_eq!(subset.name(), Some("scan"));
        assert!(!subset.is_organized());
    }

    #[test]
    fn test_extract_out_of_range() {
        let cloud = PointCloud::from_points(vec![Point::origin()]);
        assert!(matches!(
            extract_indices(&cloud, &[1]),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
