//! The parameter catalog of one connection.

use std::borrow::Borrow;
use std::sync::Arc;

use brlapi_core::{KeywordMap, ParameterId, PARAMETERS};
use once_cell::sync::OnceCell;

use crate::connection::ConnectionInner;
use crate::parameter::Parameter;

/// Every known parameter, bound to one connection.
///
/// Built once per connection, in wire-identifier order.  Name lookup accepts
/// unique abbreviations: `cursor-blink-perc` finds `cursor-blink-percentage`
/// while `cursor-blink-pe` matches nothing.
pub struct Parameters {
    parameters: Vec<Parameter>,
    names: OnceCell<KeywordMap<usize>>,
}

impl Parameters {
    pub(crate) fn new(connection: Arc<ConnectionInner>) -> Self {
        let parameters = PARAMETERS
            .iter()
            .map(|descriptor| Parameter::new(descriptor, Arc::clone(&connection)))
            .collect();

        Self {
            parameters,
            names: OnceCell::new(),
        }
    }

    pub fn get_all(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Finds a parameter by full name or unique abbreviation.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        let index = *self.names().get(name)?;
        self.parameters.get(index)
    }

    pub fn get_by_id(&self, id: ParameterId) -> &Parameter {
        // The table is ordered by identifier, one entry per identifier.
        &self.parameters[id.code() as usize]
    }

    /// Parameters a general listing should show.
    pub fn visible(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|parameter| !parameter.is_hidable())
    }

    /// Full names, in catalog order.
    pub fn names_in_order(&self) -> &[String] {
        self.names().keywords()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Orders `parameters` by name, for display.
    pub fn sort_by_name<P: Borrow<Parameter>>(parameters: &mut [P]) {
        parameters.sort_by(|a, b| a.borrow().name().cmp(b.borrow().name()));
    }

    fn names(&self) -> &KeywordMap<usize> {
        self.names.get_or_init(|| {
            let mut names = KeywordMap::new();
            for (index, parameter) in self.parameters.iter().enumerate() {
                names.put(parameter.name(), index);
            }
            names
        })
    }
}

impl std::fmt::Debug for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.parameters.iter().map(Parameter::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::connection::Connection;
    use crate::settings::ConnectionSettings;
    use crate::transport::MockTransport;

    use super::*;

    fn connection() -> Connection {
        Connection::open(Arc::new(MockTransport::new()), &ConnectionSettings::default()).unwrap()
    }

    #[test]
    fn test_catalog_holds_every_parameter_once() {
        let connection = connection();
        let parameters = connection.parameters();

        assert_eq!(parameters.len(), PARAMETERS.len());
        for (index, parameter) in parameters.get_all().iter().enumerate() {
            assert_eq!(parameter.id().code() as usize, index);
        }
    }

    #[test]
    fn test_lookup_by_name_and_abbreviation() {
        let connection = connection();
        let parameters = connection.parameters();

        assert_eq!(parameters.get("display-size").unwrap().id(), ParameterId::DisplaySize);
        assert_eq!(parameters.get("DISPLAY-SIZE").unwrap().id(), ParameterId::DisplaySize);
        assert_eq!(parameters.get("clip").unwrap().id(), ParameterId::ClipboardContent);
        assert!(parameters.get("driver").is_none());
        assert!(parameters.get("no-such-parameter").is_none());
        assert!(parameters.get("").is_none());
    }

    #[test]
    fn test_visible_skips_hidable() {
        let connection = connection();

        let visible: Vec<ParameterId> = connection.parameters().visible().map(Parameter::id).collect();

        assert!(visible.contains(&ParameterId::DriverName));
        assert!(!visible.contains(&ParameterId::ComputerBrailleRowsMask));
        assert!(!visible.contains(&ParameterId::BoundCommandKeycodes));
    }

    #[test]
    fn test_sort_by_name_orders_lexicographically() {
        // Arrange
        let connection = connection();
        let mut selected: Vec<&Parameter> = [
            ParameterId::ServerVersion,
            ParameterId::AudibleAlerts,
            ParameterId::MessageLocale,
            ParameterId::CursorDots,
        ]
        .into_iter()
        .map(|id| connection.parameters().get_by_id(id))
        .collect();

        // Act
        Parameters::sort_by_name(&mut selected);

        // Assert
        let names: Vec<&str> = selected.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["audible-alerts", "cursor-dots", "message-locale", "server-version"]);
    }

    #[test]
    fn test_names_keep_catalog_order() {
        let connection = connection();

        let names = connection.parameters().names_in_order();

        assert_eq!(names.first().map(String::as_str), Some("server-version"));
        assert_eq!(names.last().map(String::as_str), Some("device-cell-size"));
    }
}
