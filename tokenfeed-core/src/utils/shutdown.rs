use tokio::sync::watch;

/// Resolve once the shutdown flag turns `true` or its sender is dropped.
pub async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}
