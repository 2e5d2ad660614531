//! GPIO lifecycle tests against a mock sysfs tree.
//!
//! A tempdir stands in for `/sys`: the class directory holds pre-created
//! `export`/`unexport` control files and the device directory holds the
//! per-pin attribute files, as they would exist after a real export. A
//! write observer on the pin records the sysfs write sequence so ordering
//! guarantees (output forced low before the direction reset) are checkable.

use std::fs;
use std::sync::{Arc, Mutex};

use sbc_io::{Direction, Edge, Error, Pin, SysfsPaths};
use tempfile::TempDir;

type WriteLog = Arc<Mutex<Vec<(String, String)>>>;

fn mock_sysfs(pin: u32) -> (TempDir, SysfsPaths) {
    let root = tempfile::tempdir().unwrap();
    let class_dir = root.path().join("class/gpio");
    let device_dir = root.path().join("devices/virtual/gpio");
    fs::create_dir_all(&class_dir).unwrap();
    let pin_dir = device_dir.join(format!("gpio{pin}"));
    fs::create_dir_all(&pin_dir).unwrap();
    for name in ["export", "unexport"] {
        fs::write(class_dir.join(name), "").unwrap();
    }
    fs::write(pin_dir.join("value"), "0").unwrap();
    fs::write(pin_dir.join("direction"), "in").unwrap();
    fs::write(pin_dir.join("edge"), "none").unwrap();
    (
        root,
        SysfsPaths {
            class_dir,
            device_dir,
        },
    )
}

fn attach_log(pin: &mut Pin) -> WriteLog {
    let log: WriteLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    pin.set_write_observer(Some(Box::new(move |name, text| {
        sink.lock().unwrap().push((name.to_string(), text.to_string()));
    })));
    log
}

fn entries(log: &WriteLog) -> Vec<(String, String)> {
    log.lock().unwrap().clone()
}

#[test]
fn scoped_output_pin_full_lifecycle() {
    let (_root, paths) = mock_sysfs(17);
    let log;
    {
        let mut pin = Pin::new(17, Direction::Out).with_sysfs_paths(paths.clone());
        log = attach_log(&mut pin);
        pin.open().unwrap();
        pin.set(1).unwrap();
        assert_eq!(pin.get().unwrap(), 1);
        // Dropping the pin stands in for leaving the scope.
    }
    let expected: Vec<(String, String)> = [
        ("export", "17"),
        ("direction", "out"),
        ("value", "1"),
        ("value", "0"),
        ("direction", "in"),
        ("edge", "none"),
        ("unexport", "17"),
    ]
    .iter()
    .map(|(n, v)| (n.to_string(), v.to_string()))
    .collect();
    assert_eq!(entries(&log), expected);

    let pin_dir = paths.device_dir.join("gpio17");
    assert_eq!(fs::read_to_string(pin_dir.join("value")).unwrap(), "0");
    assert_eq!(fs::read_to_string(pin_dir.join("direction")).unwrap(), "in");
    assert_eq!(fs::read_to_string(pin_dir.join("edge")).unwrap(), "none");
    assert_eq!(
        fs::read_to_string(paths.class_dir.join("unexport")).unwrap(),
        "17"
    );
}

#[test]
fn close_forces_output_low_before_direction_reset() {
    let (_root, paths) = mock_sysfs(23);
    let mut pin = Pin::new(23, Direction::Out).with_sysfs_paths(paths);
    let log = attach_log(&mut pin);
    pin.open().unwrap();
    pin.set(1).unwrap();
    pin.close().unwrap();

    let seq = entries(&log);
    let low = seq
        .iter()
        .position(|e| e == &("value".to_string(), "0".to_string()))
        .expect("close must write value=0");
    let reset = seq
        .iter()
        .position(|e| e == &("direction".to_string(), "in".to_string()))
        .expect("close must reset the direction");
    assert!(
        low < reset,
        "value=0 must precede direction=in, got {seq:?}"
    );
}

#[test]
fn double_close_is_a_noop() {
    let (_root, paths) = mock_sysfs(4);
    let mut pin = Pin::new(4, Direction::Out).with_sysfs_paths(paths);
    let log = attach_log(&mut pin);
    pin.open().unwrap();
    pin.close().unwrap();
    let after_first = entries(&log).len();
    pin.close().unwrap();
    assert_eq!(entries(&log).len(), after_first);
    assert!(pin.is_closed());
}

#[test]
fn set_on_input_pin_is_rejected_without_writing() {
    let (_root, paths) = mock_sysfs(22);
    let mut pin = Pin::new(22, Direction::In).with_sysfs_paths(paths.clone());
    let log = attach_log(&mut pin);
    pin.open().unwrap();
    match pin.set(1) {
        Err(Error::NotAnOutput { pin: 22 }) => {}
        other => panic!("expected NotAnOutput, got {other:?}"),
    }
    assert!(!entries(&log).iter().any(|(name, _)| name == "value"));
    assert_eq!(
        fs::read_to_string(paths.device_dir.join("gpio22/value")).unwrap(),
        "0"
    );
}

#[test]
fn input_pin_open_applies_edge_trigger() {
    let (_root, paths) = mock_sysfs(27);
    let mut pin = Pin::with_interrupt(27, Edge::Rising).with_sysfs_paths(paths.clone());
    pin.open().unwrap();
    let pin_dir = paths.device_dir.join("gpio27");
    assert_eq!(fs::read_to_string(pin_dir.join("direction")).unwrap(), "in");
    assert_eq!(fs::read_to_string(pin_dir.join("edge")).unwrap(), "rising");
    // Input close: no value write, just the neutral reset.
    pin.close().unwrap();
    assert_eq!(fs::read_to_string(pin_dir.join("edge")).unwrap(), "none");
}

#[test]
fn closed_pin_rejects_value_and_fd_operations() {
    let (_root, paths) = mock_sysfs(5);
    let mut pin = Pin::new(5, Direction::Out).with_sysfs_paths(paths);
    assert!(matches!(pin.get(), Err(Error::PinClosed { pin: 5 })));
    assert!(matches!(pin.set(1), Err(Error::PinClosed { pin: 5 })));
    assert!(matches!(pin.fileno(), Err(Error::PinClosed { pin: 5 })));
}

#[test]
fn fileno_exposes_the_value_descriptor_while_open() {
    let (_root, paths) = mock_sysfs(6);
    let mut pin = Pin::new(6, Direction::In).with_sysfs_paths(paths);
    pin.open().unwrap();
    assert!(pin.fileno().unwrap() >= 0);
    pin.close().unwrap();
    assert!(pin.fileno().is_err());
}

#[test]
fn get_treats_empty_value_file_as_low() {
    let (_root, paths) = mock_sysfs(12);
    fs::write(paths.device_dir.join("gpio12/value"), "").unwrap();
    let mut pin = Pin::new(12, Direction::In).with_sysfs_paths(paths);
    pin.open().unwrap();
    assert_eq!(pin.get().unwrap(), 0);
}

#[test]
fn value_reads_restart_from_the_top_of_the_file() {
    let (_root, paths) = mock_sysfs(13);
    let mut pin = Pin::new(13, Direction::Out).with_sysfs_paths(paths);
    pin.open().unwrap();
    pin.set(1).unwrap();
    // Two consecutive reads both see the current state, not EOF.
    assert_eq!(pin.get().unwrap(), 1);
    assert_eq!(pin.get().unwrap(), 1);
    pin.set(0).unwrap();
    assert_eq!(pin.get().unwrap(), 0);
}

#[test]
fn setters_write_sysfs_and_update_cache() {
    let (_root, paths) = mock_sysfs(21);
    let mut pin = Pin::new(21, Direction::In).with_sysfs_paths(paths.clone());
    pin.open().unwrap();

    pin.set_direction(Direction::Out).unwrap();
    assert_eq!(pin.direction(), Direction::Out);
    assert_eq!(
        fs::read_to_string(paths.device_dir.join("gpio21/direction")).unwrap(),
        "out"
    );

    pin.set_direction(Direction::In).unwrap();
    pin.set_interrupt(Edge::Both).unwrap();
    assert_eq!(pin.interrupt(), Edge::Both);
    assert_eq!(
        fs::read_to_string(paths.device_dir.join("gpio21/edge")).unwrap(),
        "both"
    );
}

#[test]
fn open_times_out_when_the_pin_entries_never_appear() {
    // Class dir exists but the kernel "never creates" the pin directory.
    let root = tempfile::tempdir().unwrap();
    let class_dir = root.path().join("class/gpio");
    fs::create_dir_all(&class_dir).unwrap();
    fs::write(class_dir.join("export"), "").unwrap();
    fs::write(class_dir.join("unexport"), "").unwrap();
    let paths = SysfsPaths {
        class_dir,
        device_dir: root.path().join("devices/virtual/gpio"),
    };
    let mut pin = Pin::new(9, Direction::In).with_sysfs_paths(paths);
    match pin.open() {
        Err(Error::AccessTimeout { path }) => {
            assert!(path.ends_with("gpio9/value"), "unexpected path {path:?}")
        }
        other => panic!("expected AccessTimeout, got {other:?}"),
    }
    assert!(pin.is_closed());
}
