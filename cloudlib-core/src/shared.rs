//! Reference-counted, read-only cloud handle

use crate::point_cloud::PointCloud;
use std::borrow::Borrow;
use std::ops::Deref;
use std::sync::Arc;

/// A point cloud shared between several consumers
///
/// Cloning the handle is cheap and never copies points. While more than one
/// handle exists the cloud is read-only: [`SharedPointCloud::get_mut`] only
/// succeeds for the sole owner, and [`SharedPointCloud::make_mut`] detaches a
/// private copy first. Concurrent readers therefore never observe a mutation.
#[derive(Debug, Clone, Default)]
pub struct SharedPointCloud(Arc<PointCloud>);

impl SharedPointCloud {
    pub fn new(cloud: PointCloud) -> Self {
        Self(Arc::new(cloud))
    }

    /// Number of live handles to this cloud
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// True if both handles refer to the same cloud
    pub fn ptr_eq(&self, other: &SharedPointCloud) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Mutable access, only when this is the only handle
    pub fn get_mut(&mut self) -> Option<&mut PointCloud> {
        Arc::get_mut(&mut self.0)
    }

    /// Mutable access, cloning the cloud first if it is shared
    pub fn make_mut(&mut self) -> &mut PointCloud {
        Arc::make_mut(&mut self.0)
    }

    /// Recover the cloud if this is the only handle
    pub fn try_unwrap(self) -> Result<PointCloud, SharedPointCloud> {
        Arc::try_unwrap(self.0).map_err(SharedPointCloud)
    }

    /// Recover the cloud, cloning it if other handles are alive
    pub fn into_inner(self) -> PointCloud {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl Deref for SharedPointCloud {
    type Target = PointCloud;

    fn deref(&self) -> &PointCloud {
        &self.0
    }
}

impl AsRef<PointCloud> for SharedPointCloud {
    fn as_ref(&self) -> &PointCloud {
        &self.0
    }
}

impl Borrow<PointCloud> for SharedPointCloud {
    fn borrow(&self) -> &PointCloud {
        &self.0
    }
}

impl From<PointCloud> for SharedPointCloud {
    fn from(cloud: PointCloud) -> Self {
        Self::new(cloud)
    }
}
