//! Name-driven operations for command-line front ends.
//!
//! These mirror the two parameter programs of the BrlAPI tool: one lists
//! every parameter with its current value, the other sets a parameter named
//! (possibly abbreviated) by the user to a value given as text.

use tracing::info;

use crate::connection::Connection;
use crate::error::ClientError;
use crate::parameter::Parameter;
use crate::parameters::Parameters;

/// One line of a parameter listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterListing {
    pub name: &'static str,
    /// The rendered value, or `None` if the parameter has no value.
    pub value: Option<String>,
}

/// Reads every parameter and renders its value, sorted by name.
///
/// Hidable parameters are skipped unless `include_hidden` is set.
///
/// # Errors
///
/// Stops at the first failed read.
pub fn list_parameters(
    connection: &Connection,
    include_hidden: bool,
) -> Result<Vec<ParameterListing>, ClientError> {
    let mut selected: Vec<&Parameter> = connection
        .parameters()
        .get_all()
        .iter()
        .filter(|parameter| include_hidden || !parameter.is_hidable())
        .collect();
    Parameters::sort_by_name(&mut selected);

    selected
        .into_iter()
        .map(|parameter| -> Result<ParameterListing, ClientError> {
            Ok(ParameterListing {
                name: parameter.name(),
                value: parameter.get()?.map(|value| value.to_string()),
            })
        })
        .collect()
}

/// Sets the parameter called `name` from `text`.
///
/// # Errors
///
/// [`ClientError::UnknownParameter`] if `name` matches no parameter or is an
/// ambiguous abbreviation; otherwise whatever [`Parameter::set_text`] fails
/// with.
pub fn set_parameter(connection: &Connection, name: &str, text: &str) -> Result<(), ClientError> {
    let parameter = connection
        .parameters()
        .get(name)
        .ok_or_else(|| ClientError::UnknownParameter(name.to_string()))?;

    parameter.set_text(text)?;

    info!(parameter = parameter.name(), value = text, "parameter set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use brlapi_core::{ParameterId, ParameterValue, PARAMETERS};

    use super::*;
    use crate::settings::ConnectionSettings;
    use crate::transport::MockTransport;

    fn open(transport: &Arc<MockTransport>) -> Connection {
        Connection::open(transport.clone(), &ConnectionSettings::default()).unwrap()
    }

    #[test]
    fn test_listing_is_sorted_and_skips_hidden() {
        // Arrange
        let transport = Arc::new(MockTransport::new());
        transport.put_value(ParameterId::DriverName, 0, true, ParameterValue::String("XWindow".to_string()));
        transport.put_value(ParameterId::DisplaySize, 0, true, ParameterValue::Ints(vec![40, 1]));
        let connection = open(&transport);

        // Act
        let listing = list_parameters(&connection, false).unwrap();

        // Assert
        let names: Vec<&str> = listing.iter().map(|entry| entry.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(!names.contains(&"computer-braille-rows-mask"));

        let display = listing.iter().find(|entry| entry.name == "display-size").unwrap();
        assert_eq!(display.value.as_deref(), Some("40 1"));
        let model = listing.iter().find(|entry| entry.name == "device-model").unwrap();
        assert_eq!(model.value, None);
    }

    #[test]
    fn test_listing_can_include_hidden() {
        let transport = Arc::new(MockTransport::new());
        let connection = open(&transport);

        let listing = list_parameters(&connection, true).unwrap();

        assert_eq!(listing.len(), PARAMETERS.len());
        assert!(listing.iter().any(|entry| entry.name == "computer-braille-rows-mask"));
    }

    #[test]
    fn test_set_by_abbreviated_name() {
        let transport = Arc::new(MockTransport::new());
        let connection = open(&transport);

        set_parameter(&connection, "cursor-blink-perc", "40").unwrap();

        assert_eq!(
            transport.value(ParameterId::CursorBlinkPercentage, 0, true),
            Some(ParameterValue::Byte(40))
        );
    }

    #[test]
    fn test_ambiguous_name_is_unknown() {
        let transport = Arc::new(MockTransport::new());
        let connection = open(&transport);

        let result = set_parameter(&connection, "cursor-blink-pe", "40");

        assert!(matches!(result, Err(ClientError::UnknownParameter(ref name)) if name == "cursor-blink-pe"));
        assert_eq!(transport.set_count(), 0);
    }
}
