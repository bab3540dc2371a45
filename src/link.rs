use std::future::Future;

use tracing::debug;

use crate::error::Result;
use crate::lywsd02::{Characteristic, EncodedWrite};

/// Writes bytes to a characteristic of an already connected device.
pub trait LinkExecutor {
    fn write(
        &mut self,
        target: Characteristic,
        bytes: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Sends `writes` strictly in order, stopping at the first failure.
///
/// Writes that already went out are not rolled back; the device has no
/// transactional interface.
pub async fn execute_writes<L: LinkExecutor>(link: &mut L, writes: &[EncodedWrite]) -> Result<()> {
    for (i, write) in writes.iter().enumerate() {
        debug!(
            step = i + 1,
            total = writes.len(),
            target = %write.target,
            bytes = ?write.bytes,
            "writing characteristic"
        );
        link.write(write.target, &write.bytes).await?;
    }

    Ok(())
}
