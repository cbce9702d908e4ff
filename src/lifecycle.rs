use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

/// A local listener held open for the duration of a run.
///
/// It does not serve anything; it only claims an ephemeral port so that
/// hosts watching for a bound socket see the process as alive. Drop it (or
/// call [`KeepAlive::release`]) once the batch is done.
pub struct KeepAlive {
    listener: TcpListener,
}

impl KeepAlive {
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("binding keep-alive listener")?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("reading keep-alive listener address")
    }

    pub fn port(&self) -> Result<u16> {
        Ok(self.local_addr()?.port())
    }

    pub fn release(self) {
        drop(self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_an_ephemeral_port_and_frees_it() -> Result<()> {
        let keep_alive = KeepAlive::bind().await?;
        let addr = keep_alive.local_addr()?;
        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_loopback());

        keep_alive.release();
        let rebound = TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
        Ok(())
    }
}
