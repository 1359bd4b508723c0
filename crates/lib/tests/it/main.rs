/*! Integration tests for Tessera.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - identity: Phrase generation, validation and deterministic derivation
 * - storage: Session snapshot codec and the file-backed store
 * - session: Lifecycle, reconciliation and failure policy of Session
 * - preferences: Debounced preference sync driven by a live session
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("tessera=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod preferences;
mod session;
mod storage;
