//! Provider selection tests
//!
//! The first reachable candidate is chosen once and kept for the life of
//! the scanner.

use sys_marker_scan::errors::ScanError;
use sys_marker_scan::pools::PoolRegistry;

use crate::common::{antpool_chain_at, scanner_over};

#[tokio::test]
async fn test_first_reachable_candidate_is_selected_and_cached() {
    let primary = antpool_chain_at("mock://primary");
    let secondary = antpool_chain_at("mock://secondary");
    primary.set_reachable(false);

    let scanner = scanner_over(
        vec![primary.clone(), secondary.clone()],
        PoolRegistry::empty(),
    );
    assert!(scanner.selector().selected().is_none());

    let results = scanner.compute_top8().await.unwrap();
    assert_eq!(results.len(), 8);
    let selected = scanner.selector().selected().unwrap();
    assert_eq!(selected.base(), "mock://secondary");

    // Recovery of the primary does not trigger a new selection
    primary.set_reachable(true);
    scanner.compute_top8().await.unwrap();
    assert_eq!(primary.recent_calls(), 1);
    assert_eq!(
        scanner.selector().selected().unwrap().base(),
        "mock://secondary"
    );
}

#[tokio::test]
async fn test_selected_provider_failure_is_not_failed_over() {
    let primary = antpool_chain_at("mock://primary");
    let secondary = antpool_chain_at("mock://secondary");
    let scanner = scanner_over(
        vec![primary.clone(), secondary.clone()],
        PoolRegistry::empty(),
    );

    scanner.compute_top8().await.unwrap();
    primary.set_reachable(false);

    let err = scanner.compute_top8().await.unwrap_err();
    assert!(matches!(err, ScanError::PageFetchFailed { ref anchor, .. } if anchor == "tip"));
    assert_eq!(secondary.recent_calls(), 0);
}

#[tokio::test]
async fn test_no_reachable_provider() {
    let primary = antpool_chain_at("mock://primary");
    let secondary = antpool_chain_at("mock://secondary");
    primary.set_reachable(false);
    secondary.set_reachable(false);

    let scanner = scanner_over(vec![primary, secondary], PoolRegistry::empty());
    let err = scanner.compute_top8().await.unwrap_err();

    match err {
        ScanError::NoProviderReachable { tried } => {
            assert_eq!(tried, "mock://primary, mock://secondary");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(scanner.selector().selected().is_none());
}

#[tokio::test]
async fn test_tip_height_from_selected_provider() {
    let scanner = scanner_over(vec![antpool_chain_at("mock://tip")], PoolRegistry::empty());
    assert_eq!(scanner.current_tip_height().await.unwrap(), 110);
}
