//! Collaborator traits for cloudlib

use crate::error::Result;
use crate::shared::SharedPointCloud;

/// Downstream consumer of named clouds, e.g. a renderer
///
/// Implementations typically walk the cloud once to build their own
/// buffers. The handle is read-only, so the points stay stable for as long as
/// the consumer holds it.
pub trait CloudConsumer {
    /// Register a cloud under `name`
    fn add_cloud(&mut self, name: &str, cloud: SharedPointCloud) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use crate::point_cloud::PointCloud;

    #[derive(Default)]
    struct VertexBuffer {
        names: Vec<String>,
        vertices: Vec<f32>,
    }

    impl CloudConsumer for VertexBuffer {
        fn add_cloud(&mut self, name: &str, cloud: SharedPointCloud) -> Result<()> {
            self.names.push(name.to_string());
            for p in cloud.iter() {
                self.vertices.extend_from_slice(&p.to_array());
            }
            Ok(())
        }
    }

    #[test]
    fn test_consumer_reads_shared_cloud() {
        let cloud = SharedPointCloud::new(PointCloud::from_points(vec![
            Point::new(1.0, 2.0, 3.0),
            Point::new(4.0, 5.0, 6.0),
        ]));

        let mut buffer = VertexBuffer::default();
        buffer.add_cloud("cloud1", cloud.clone()).unwrap();

        assert_eq!(buffer.names, vec!["cloud1"]);
        assert_eq!(buffer.vertices, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(cloud.handle_count(), 1);
    }
}
