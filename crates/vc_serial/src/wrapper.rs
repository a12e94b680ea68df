//! A single polymorphic value nested in a concrete parent.

use alloc::boxed::Box;
use alloc::string::String;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::{Mapper, SerialError, Tagged};

// -----------------------------------------------------------------------------
// Wrapper

/// A type name paired with the JSON encoding of a value of that type.
///
/// Use it in a concrete parent's serde implementation for fields that hold a
/// trait object. It is written as `{"TypeName": "...", "Contents": {...}}` and the
/// contents are kept byte for byte until [`unwrap`](Self::unwrap) decodes them.
///
/// The mapper passed to [`wrap`](Self::wrap) and [`unwrap`](Self::unwrap) is
/// attached to [`Recursive`](crate::Recursive) values while they are encoded or
/// decoded.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_serial::{Mapper, RegistryArc, Wrapper, derive::Tagged};
///
/// #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
/// pub struct Widget {
///     name: String,
/// }
///
/// let registry = RegistryArc::default();
/// registry.register::<Widget>().unwrap();
/// let mapper = Mapper::new(registry);
///
/// let wrapper = Wrapper::wrap(&mapper, &Widget { name: "x".into() }).unwrap();
/// let json = serde_json::to_string(&wrapper).unwrap();
/// assert!(json.ends_with(r#"/Widget","Contents":{"name":"x"}}"#));
///
/// let wrapper: Wrapper = serde_json::from_str(&json).unwrap();
/// let widget = wrapper.unwrap(&mapper).unwrap().take::<Widget>().unwrap();
/// assert_eq!(widget.name, "x");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Wrapper {
    #[serde(rename = "TypeName")]
    type_name: String,
    #[serde(rename = "Contents")]
    contents: Box<RawValue>,
}

impl Wrapper {
    /// Captures the current name of the item's type and the item's encoding.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the item's type is unknown.
    /// - [`SerialError::NotSerializable`] if the type has no serde encoding.
    /// - [`SerialError::Encode`] if encoding fails.
    ///
    /// [`RegistryError::NotRegistered`]: crate::RegistryError::NotRegistered
    pub fn wrap(mapper: &Mapper, item: &dyn Tagged) -> Result<Self, SerialError> {
        let type_name = mapper.registry().name_for(item)?;
        let serialize = item.as_serialize().ok_or(SerialError::NotSerializable {
            type_path: item.reflect_type_path(),
        })?;

        let _guard = item.as_recursive().map(|r| r.attach(mapper.clone()));
        let contents = serde_json::value::to_raw_value(serialize).map_err(SerialError::encode)?;
        Ok(Self {
            type_name,
            contents,
        })
    }

    /// Makes a value of the named type and decodes the contents into it.
    ///
    /// # Errors
    ///
    /// - [`SerialError::EmptyTypeName`] if the type name is empty.
    /// - [`RegistryError::NotRegistered`] if the name is unknown.
    /// - [`SerialError::Decode`] if the contents do not match the type.
    ///
    /// [`RegistryError::NotRegistered`]: crate::RegistryError::NotRegistered
    pub fn unwrap(&self, mapper: &Mapper) -> Result<Box<dyn Tagged>, SerialError> {
        if self.type_name.is_empty() {
            return Err(SerialError::EmptyTypeName);
        }

        let mut item = mapper.registry().make(&self.type_name)?;
        mapper.attached(&mut *item, |item| {
            let mut de = serde_json::Deserializer::from_str(self.contents.get());
            item.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut de))
                .map_err(SerialError::decode)?;
            de.end().map_err(SerialError::decode)
        })?;
        Ok(item)
    }

    /// [`unwrap`](Self::unwrap) followed by a registry cast.
    pub fn unwrap_as<U: ?Sized + 'static>(&self, mapper: &Mapper) -> Result<Box<U>, SerialError> {
        let item = self.unwrap(mapper)?;
        Ok(mapper.registry().read().cast::<U>(item)?)
    }

    /// The name the value was wrapped under.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The raw JSON encoding of the value.
    #[inline]
    pub fn contents(&self) -> &str {
        self.contents.get()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;

    use super::Wrapper;
    use crate::testing::{
        Account, Alpha, Bond, Bravo, Film, INVESTMENTS, Investment, Shelf, Stock, pkg, registry_with_film,
    };
    use crate::{Mapper, RegistryArc, SerialError, Tagged};

    fn widget_mapper() -> Mapper {
        let registry = RegistryArc::default();
        registry.add_alias::<pkg::Widget>("t").unwrap();
        registry.register::<pkg::Widget>().unwrap();
        Mapper::new(registry)
    }

    #[test]
    fn widget_round_trip() {
        let mapper = widget_mapper();
        let wrapper = Wrapper::wrap(&mapper, &pkg::Widget { name: "x".into() }).unwrap();
        assert_eq!(wrapper.type_name(), "[t]Widget");
        assert_eq!(wrapper.contents(), r#"{"name":"x"}"#);

        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, r#"{"TypeName":"[t]Widget","Contents":{"name":"x"}}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        let widget = back.unwrap(&mapper).unwrap().take::<pkg::Widget>().unwrap();
        assert_eq!(widget, pkg::Widget { name: "x".into() });
    }

    #[test]
    fn wrap_errors() {
        let mapper = widget_mapper();
        let err = Wrapper::wrap(&mapper, &Stock::default()).unwrap_err();
        assert!(err.is_not_registered());

        let mapper = Mapper::new(RegistryArc::default());
        mapper.registry().register::<Film>().unwrap();
        let err = Wrapper::wrap(&mapper, &Film::default()).unwrap_err();
        assert!(matches!(err, SerialError::NotSerializable { .. }));
    }

    #[test]
    fn unwrap_errors() {
        let mapper = widget_mapper();

        let wrapper: Wrapper = serde_json::from_str(r#"{"TypeName":"","Contents":{}}"#).unwrap();
        assert!(matches!(wrapper.unwrap(&mapper), Err(SerialError::EmptyTypeName)));

        let wrapper: Wrapper = serde_json::from_str(r#"{"TypeName":"[t]Gadget","Contents":{}}"#).unwrap();
        assert!(wrapper.unwrap(&mapper).unwrap_err().is_not_registered());

        let wrapper: Wrapper =
            serde_json::from_str(r#"{"TypeName":"[t]Widget","Contents":{"name":7}}"#).unwrap();
        assert!(matches!(wrapper.unwrap(&mapper), Err(SerialError::Decode(_))));
    }

    #[test]
    fn recursive_round_trip() {
        let registry = registry_with_film();
        registry.register::<Shelf>().unwrap();
        let mapper = Mapper::new(registry);

        let shelf = Shelf::new(
            "top",
            vec![Box::new(Alpha::new("Goober", 13.23)), Box::new(Bravo::new(true, 17))],
        );
        assert!(serde_json::to_string(&shelf).is_err());

        let wrapper = Wrapper::wrap(&mapper, &shelf).unwrap();
        assert!(shelf.is_detached());
        assert_eq!(wrapper.type_name(), "[test]Shelf");
        assert!(wrapper.contents().contains(r#"{"<type>":"[test]Alpha""#));

        let json = serde_json::to_string(&wrapper).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        let back = back.unwrap(&mapper).unwrap().take::<Shelf>().unwrap();
        assert!(back.is_detached());
        assert_eq!(back.label, "top");
        assert_eq!(back.declaims(), shelf.declaims());
    }

    #[test]
    fn account_round_trip() {
        let stock = || -> Box<dyn Investment> {
            Box::new(Stock {
                symbol: "ACME".into(),
                shares: 10,
                price: 12.5,
            })
        };
        let bond = || -> Box<dyn Investment> {
            Box::new(Bond {
                source: "Treasury".into(),
                units: 4,
                price: 100.0,
                interest: 2.5,
            })
        };

        let account = Account {
            favorite: Some(stock()),
            positions: vec![stock(), bond()],
            lookup: BTreeMap::from([(String::from("ACME"), stock()), (String::from("T"), bond())]),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains(r#""Favorite":{"TypeName":"[inv]Stock","Contents":{"#));
        assert!(json.contains(r#""TypeName":"[inv]Bond""#));

        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total(), account.total());
        assert_eq!(back.total(), 525.0);

        let favorite: Box<dyn Tagged> = back.favorite.unwrap();
        assert_eq!(favorite.downcast_ref::<Stock>().unwrap().symbol, "ACME");

        let registry = INVESTMENTS.read();
        let bond: &dyn Tagged = &*back.lookup["T"];
        assert!(bond.is::<Bond>());
        assert_eq!(back.lookup.len(), 2);
        assert_eq!(registry.name_for(&*back.lookup["ACME"]).unwrap(), "[inv]Stock");
    }
}
