//! Integration tests for the static parameter table working together with
//! keyword resolution and settable parsing, as a name-driven tool uses them.

use brlapi_core::{
    param::ValueError, CommandKeycode, KeywordMap, ParameterId, ParameterValue, ParseError,
    PARAMETERS,
};

fn name_map() -> KeywordMap<ParameterId> {
    let mut map = KeywordMap::new();
    for descriptor in &PARAMETERS {
        map.put(descriptor.name(), descriptor.id);
    }
    map
}

#[test]
fn test_every_parameter_resolves_by_full_name() {
    let map = name_map();

    for descriptor in &PARAMETERS {
        assert_eq!(map.get(descriptor.name()), Some(&descriptor.id));
    }
    assert_eq!(map.len(), PARAMETERS.len());
}

#[test]
fn test_abbreviations_resolve_only_when_unique() {
    let map = name_map();

    // `device-` starts device-model, device-online, device-speed, ...
    assert_eq!(map.get("device-"), None);
    assert_eq!(map.get("device-on"), Some(&ParameterId::DeviceOnline));
    assert_eq!(map.get("cursor-blink-pe"), None);
    assert_eq!(map.get("cursor-blink-perc"), Some(&ParameterId::CursorBlinkPercentage));
    assert_eq!(map.get("msg"), None);
    assert_eq!(map.get("mess"), Some(&ParameterId::MessageLocale));
}

#[test]
fn test_named_parameter_parses_operand_through_its_capability() {
    // Arrange
    let map = name_map();
    let id = *map.get("client-priority").expect("known parameter");
    let settable = id.descriptor().settable.expect("settable parameter");

    // Act
    let accepted = settable.parse(id.name(), "50");
    let rejected = settable.parse(id.name(), "150");

    // Assert
    assert_eq!(accepted, Ok(ParameterValue::Int(50)));
    assert_eq!(
        rejected,
        Err(ValueError::Parse(ParseError::TooLarge {
            maximum: 100,
            description: "client-priority".to_string(),
            operand: "150".to_string(),
        }))
    );
}

#[test]
fn test_read_only_parameters_have_no_capability() {
    for id in [
        ParameterId::ServerVersion,
        ParameterId::DisplaySize,
        ParameterId::DeviceOnline,
        ParameterId::BoundCommandKeycodes,
    ] {
        assert!(id.descriptor().settable.is_none(), "{id}");
    }
}

#[test]
fn test_bound_keycodes_render_as_command_keycodes() {
    let value = ParameterValue::Longs(vec![0x2032_0007]);

    let ParameterValue::Longs(codes) = &value else {
        panic!("expected a long array");
    };
    let keycode = CommandKeycode::new(codes[0]);

    assert_eq!(keycode.command(), 0x32);
    assert_eq!(value.to_string(), "0x20320007");
}
