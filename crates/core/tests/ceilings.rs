use std::io::Write;

use ledbank_core::{ChannelBank, ChannelId, Error};
use pretty_assertions::assert_eq;

fn ceilings(bank: &ChannelBank) -> Vec<(u16, u8)> {
    bank.iter().map(|c| (c.id().0, c.max_intensity())).collect()
}

#[test]
fn test_save_load_round_trip() {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("led_config.cfg");

    let mut bank = ChannelBank::new();
    for channel in bank.iter_mut() {
        let value = (channel.id().0 * 7 % 256) as u8;
        channel.set_max_intensity(value);
    }
    bank.save_max_intensities(&path).unwrap();

    let mut restored = ChannelBank::new();
    let report = restored.load_max_intensities(&path).unwrap();
    assert_eq!(report.applied, 30);
    assert!(report.unknown.is_empty());
    assert_eq!(ceilings(&restored), ceilings(&bank));
}

#[test]
fn test_saved_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ceilings.cfg");

    let mut bank = ChannelBank::new();
    bank.get_mut(ChannelId(2)).unwrap().set_max_intensity(100);
    bank.save_max_intensities(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 30);
    assert_eq!(lines[0], "1 255");
    assert_eq!(lines[1], "2 100");
    assert_eq!(lines[25], "26 0");
    assert!(text.ends_with('\n'));

    // Saving again overwrites the previous content.
    bank.save_max_intensities(&path).unwrap();
    let text_2 = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, text_2);
}

#[test]
fn test_load_unknown_id_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ceilings.cfg");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "99 12").unwrap();
    drop(file);

    let mut bank = ChannelBank::new();
    let before = ceilings(&bank);
    let report = bank.load_max_intensities(&path).unwrap();

    assert_eq!(report.applied, 0);
    assert_eq!(report.unknown, vec![99]);
    assert_eq!(ceilings(&bank), before);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut bank = ChannelBank::new();

    let err = bank
        .load_max_intensities(dir.path().join("missing.cfg"))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_save_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let bank = ChannelBank::new();

    let err = bank
        .save_max_intensities(dir.path().join("no/such/dir/led_config.cfg"))
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_lookup_all_ids() {
    let bank = ChannelBank::new();
    for id in 1..=30 {
        assert_eq!(bank.get(ChannelId(id)).unwrap().id(), ChannelId(id));
    }

    for id in [0, 31, 99, u16::MAX] {
        assert!(matches!(bank.get(ChannelId(id)), Err(Error::NotFound(_))));
    }
}
