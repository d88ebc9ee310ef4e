mod common;

use common::{ExposureEvent, FakeBoard, RecordingExposure};
use qwx_ioe::{
    AttachError, Board, BoardConfig, ExpansionError, RegistrationError, OUTPUTS_COUNT,
    READERS_COUNT,
};

const ALL_ENDPOINTS: [&str; 5] = ["exp0/s0", "exp0/s1", "exp0/s2", "exp0/w0", "exp0/w1"];

fn attach(exposure: &mut RecordingExposure) -> Result<Board<FakeBoard, String>, ExpansionError> {
    Board::attach(FakeBoard::new(), &BoardConfig::default(), exposure)
}

#[test]
fn attach_registers_outputs_then_readers_in_order() {
    let mut exposure = RecordingExposure::new();
    let board = attach(&mut exposure).unwrap();

    assert_eq!(exposure.registered(), ALL_ENDPOINTS);
    assert!(exposure.unregistered().is_empty());
    assert_eq!(board.endpoint_names().collect::<Vec<_>>(), ALL_ENDPOINTS);
    assert_eq!(board.outputs().len(), OUTPUTS_COUNT);
    assert_eq!(board.readers().len(), READERS_COUNT);
    assert!(board.output(OUTPUTS_COUNT).is_none());
    assert!(board.reader(READERS_COUNT).is_none());
}

#[test]
fn channels_carry_their_index() {
    let mut exposure = RecordingExposure::new();
    let board = attach(&mut exposure).unwrap();

    for (i, output) in board.outputs().iter().enumerate() {
        assert_eq!(usize::from(output.index()), i);
    }
    for (i, reader) in board.readers().iter().enumerate() {
        assert_eq!(usize::from(reader.index()), i);
    }
}

#[test]
fn endpoint_names_use_board_name() {
    let mut exposure = RecordingExposure::new();
    let config = BoardConfig {
        name: "door".to_owned(),
        ..BoardConfig::default()
    };

    let board = Board::attach(FakeBoard::new(), &config, &mut exposure).unwrap();

    assert_eq!(board.name(), "door");
    assert_eq!(
        exposure.registered(),
        ["door/s0", "door/s1", "door/s2", "door/w0", "door/w1"]
    );
}

#[test]
fn wrong_address_is_rejected_before_registering_anything() {
    let mut exposure = RecordingExposure::new();
    let fake = FakeBoard::new();
    let config = BoardConfig {
        address: 0x51,
        ..BoardConfig::default()
    };

    let err = Board::<_, String>::attach(fake.clone(), &config, &mut exposure).unwrap_err();

    assert!(matches!(
        err,
        ExpansionError::Attach(AttachError::UnrecognizedAddress {
            found: 0x51,
            expected: 0x50
        })
    ));
    assert!(exposure.events.is_empty());
    assert!(fake.log().is_empty());
}

#[test]
fn failing_output_rolls_back_earlier_outputs_only() {
    let mut exposure = RecordingExposure::refusing_registration_of("exp0/s1");

    let err = attach(&mut exposure).unwrap_err();

    assert!(matches!(
        err,
        ExpansionError::Registration(RegistrationError::Rejected { ref name, .. }) if name == "exp0/s1"
    ));
    assert_eq!(
        exposure.events,
        vec![
            ExposureEvent::Registered("exp0/s0".to_owned()),
            ExposureEvent::Unregistered("exp0/s0".to_owned()),
        ]
    );
}

#[test]
fn failing_first_reader_rolls_back_every_output() {
    let mut exposure = RecordingExposure::refusing_registration_of("exp0/w0");

    let err = attach(&mut exposure).unwrap_err();

    assert!(matches!(err, ExpansionError::Registration(_)));
    assert_eq!(exposure.registered(), ["exp0/s0", "exp0/s1", "exp0/s2"]);
    assert_eq!(exposure.unregistered(), ["exp0/s2", "exp0/s1", "exp0/s0"]);
}

#[test]
fn failing_second_reader_rolls_back_first_reader_and_outputs() {
    let mut exposure = RecordingExposure::refusing_registration_of("exp0/w1");

    attach(&mut exposure).unwrap_err();

    assert_eq!(
        exposure.unregistered(),
        ["exp0/w0", "exp0/s2", "exp0/s1", "exp0/s0"]
    );
    assert!(!exposure.registered().contains(&"exp0/w1"));
}

#[test]
fn rollback_failure_does_not_mask_original_error() {
    let mut exposure = RecordingExposure::refusing_registration_of("exp0/s2");
    exposure.refuse_unregistration_of("exp0/s0");

    let err = attach(&mut exposure).unwrap_err();

    assert!(matches!(
        err,
        ExpansionError::Registration(RegistrationError::Rejected { ref name, .. }) if name == "exp0/s2"
    ));
    assert_eq!(exposure.unregistered(), ["exp0/s1"]);
}

#[test]
fn detach_unregisters_everything_and_returns_the_bus() {
    let fake = FakeBoard::new();
    let mut exposure = RecordingExposure::new();
    let board = Board::attach(fake.clone(), &BoardConfig::default(), &mut exposure).unwrap();

    let detached = board.detach(&mut exposure).unwrap();

    assert!(detached.is_clean());
    assert_eq!(exposure.unregistered(), ALL_ENDPOINTS);

    detached.transport.set_output(0, true);
    assert!(fake.output(0));
}

#[test]
fn detach_keeps_going_after_a_failed_unregistration() {
    let mut exposure = RecordingExposure::new();
    let board = attach(&mut exposure).unwrap();
    exposure.refuse_unregistration_of("exp0/s1");

    let detached = board.detach(&mut exposure).unwrap();

    assert_eq!(detached.failures.len(), 1);
    assert_eq!(detached.failures[0].name, "exp0/s1");
    assert_eq!(
        exposure.unregistered(),
        ["exp0/s0", "exp0/s2", "exp0/w0", "exp0/w1"]
    );
}
