//! Loading tests against the real platform loader.
//!
//! These never need the vendor library: they cover the two load-time
//! failures, which must leave the binding unloaded.

use netherdream::native::{GET_CARD_NUM, SYMBOLS};
use netherdream::{Error, EtherDreamLib, LibraryConfig, LibraryState};

#[test]
fn absent_library_fails_and_stays_unloaded() {
    let config = LibraryConfig::new().with_search_dir("/definitely/not/here");
    let mut lib = EtherDreamLib::with_config(config);

    let err = lib.load().expect_err("load should fail");
    assert!(err.is_library_error());
    assert!(matches!(err, Error::LibraryNotFound { .. }));
    assert!(!lib.is_loaded());
    assert_eq!(lib.state(), LibraryState::NotLoaded);
}

#[test]
fn device_calls_after_failed_load_are_detected() {
    let mut lib = EtherDreamLib::with_config(LibraryConfig::new().with_path("/nope/EtherDream.dll"));
    assert!(lib.load().is_err());

    match lib.count_devices() {
        Err(Error::NotLoaded { operation }) => assert_eq!(operation, "count_devices"),
        other => panic!("expected NotLoaded, got {:?}", other),
    }
    assert!(lib.list_devices().is_err());
}

#[test]
fn vendor_exports_eight_entry_points() {
    assert_eq!(SYMBOLS.len(), 8);
    assert_eq!(SYMBOLS[0], GET_CARD_NUM);
    assert!(SYMBOLS.iter().all(|s| s.starts_with("EtherDream")));
}

/// libc loads fine but exports none of the vendor symbols.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn library_without_entry_points_is_unloaded_again() {
    let config = LibraryConfig::new().with_path("libc.so.6");
    let mut lib = EtherDreamLib::with_config(config);

    match lib.load() {
        Err(Error::MissingSymbol {
            library, symbol, ..
        }) => {
            assert_eq!(library, "libc.so.6");
            assert_eq!(symbol, GET_CARD_NUM);
        }
        other => panic!("expected MissingSymbol, got {:?}", other),
    }
    assert!(!lib.is_loaded());
    assert!(matches!(lib.close(), Err(Error::NotLoaded { .. })));
}
