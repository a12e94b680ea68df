//! Fixtures shared by the unit tests.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::derive::Tagged;
use crate::mapper::{pull_fields, push_fields};
use crate::{AttrMap, Mappable, RegistryArc, SerialError, Tagged, TypePath, WithMapper};

// -----------------------------------------------------------------------------
// Actors

pub trait Actor: Tagged {
    fn declaim(&self) -> String;
}

#[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Alpha {
    pub name: String,
    pub percent: f32,
    #[serde(skip)]
    pub extra: String,
}

impl Alpha {
    pub fn new(name: &str, percent: f32) -> Self {
        Self {
            name: name.into(),
            percent,
            extra: String::from("extra"),
        }
    }
}

impl Actor for Alpha {
    fn declaim(&self) -> String {
        format!("{} is {:.2}% complete", self.name, self.percent)
    }
}

#[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Bravo {
    pub finished: bool,
    pub iterations: u32,
    #[serde(skip)]
    pub extra: String,
}

impl Bravo {
    pub fn new(finished: bool, iterations: u32) -> Self {
        Self {
            finished,
            iterations,
            extra: String::from("extra"),
        }
    }
}

impl Actor for Bravo {
    fn declaim(&self) -> String {
        let state = if self.finished { "finished" } else { "running" };
        format!("{state} after {} iterations", self.iterations)
    }
}

// -----------------------------------------------------------------------------
// Film

/// A container with polymorphic fields, mapped through its own [`Mappable`] impl.
#[derive(Tagged, Default)]
#[tagged(mappable)]
pub struct Film {
    pub name: String,
    pub lead: Option<Box<dyn Actor>>,
    pub cast: Vec<Box<dyn Actor>>,
    pub index: BTreeMap<String, usize>,
    #[tagged(mapper)]
    pub with_mapper: WithMapper,
}

#[derive(Serialize, Deserialize)]
struct FilmFields {
    name: String,
    index: BTreeMap<String, usize>,
}

impl Film {
    pub fn new(name: &str, lead: Box<dyn Actor>, cast: Vec<Box<dyn Actor>>) -> Self {
        let index = cast
            .iter()
            .enumerate()
            .map(|(position, actor)| (actor.declaim(), position))
            .collect();
        Self {
            name: name.into(),
            lead: Some(lead),
            cast,
            index,
            with_mapper: WithMapper::new(),
        }
    }

    pub fn is_detached(&self) -> bool {
        crate::Recursive::mapper(&self.with_mapper).is_none()
    }

    pub fn assert_same(&self, other: &Film) {
        assert_eq!(self.name, other.name);
        assert_eq!(self.index, other.index);
        assert_eq!(
            self.lead.as_ref().map(|lead| lead.declaim()),
            other.lead.as_ref().map(|lead| lead.declaim())
        );
        let declaim = |cast: &[Box<dyn Actor>]| cast.iter().map(|a| a.declaim()).collect::<Vec<_>>();
        assert_eq!(declaim(&self.cast), declaim(&other.cast));
    }

    fn mapper(&self) -> Result<crate::Mapper, SerialError> {
        crate::Recursive::mapper(&self.with_mapper).ok_or(SerialError::NoMapper {
            type_path: Self::type_path(),
        })
    }
}

impl Mappable for Film {
    fn push_to_map(&self, map: &mut AttrMap) -> Result<(), SerialError> {
        let mapper = self.mapper()?;
        push_fields(
            &FilmFields {
                name: self.name.clone(),
                index: self.index.clone(),
            },
            map,
        )?;

        if let Some(lead) = &self.lead {
            map.insert("lead".into(), Value::Object(mapper.to_map(&**lead)?));
        }
        let cast = self
            .cast
            .iter()
            .map(|actor| mapper.to_map(&**actor).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        map.insert("cast".into(), Value::Array(cast));
        Ok(())
    }

    fn pull_from_map(&mut self, map: &AttrMap) -> Result<(), SerialError> {
        let mapper = self.mapper()?;
        let FilmFields { name, index } = pull_fields(map)?;
        self.name = name;
        self.index = index;

        self.lead = match map.get("lead") {
            Some(Value::Object(lead)) => Some(mapper.from_map_as::<dyn Actor>(lead)?),
            Some(Value::Null) | None => None,
            Some(other) => return Err(SerialError::mapping(format_args!("bad lead `{other}`"))),
        };

        self.cast.clear();
        if let Some(Value::Array(cast)) = map.get("cast") {
            for actor in cast {
                match actor {
                    Value::Object(actor) => self.cast.push(mapper.from_map_as::<dyn Actor>(actor)?),
                    other => return Err(SerialError::mapping(format_args!("bad actor `{other}`"))),
                }
            }
        }
        Ok(())
    }
}

/// A registry with the actors and [`Film`] under the alias `test`.
pub fn registry_with_film() -> RegistryArc {
    let registry = RegistryArc::default();
    {
        let mut registry = registry.write();
        registry.add_alias::<Alpha>("test").unwrap();
        registry.register::<Alpha>().unwrap();
        registry.register::<Bravo>().unwrap();
        registry.register::<Film>().unwrap();
        registry.register_cast::<Alpha, dyn Actor>(|alpha| alpha).unwrap();
        registry.register_cast::<Bravo, dyn Actor>(|bravo| bravo).unwrap();
    }
    registry
}

// -----------------------------------------------------------------------------
// Shelf

/// A mappable container that also has a serde encoding, for use in a [`Wrapper`].
///
/// [`Wrapper`]: crate::Wrapper
#[derive(Tagged, Default)]
#[tagged(mappable, serialize)]
pub struct Shelf {
    pub label: String,
    pub items: Vec<Box<dyn Actor>>,
    #[tagged(mapper)]
    pub with_mapper: WithMapper,
}

#[derive(Serialize, Deserialize)]
struct ShelfFields {
    label: String,
}

impl Shelf {
    pub fn new(label: &str, items: Vec<Box<dyn Actor>>) -> Self {
        Self {
            label: label.into(),
            items,
            with_mapper: WithMapper::new(),
        }
    }

    pub fn is_detached(&self) -> bool {
        crate::Recursive::mapper(&self.with_mapper).is_none()
    }

    pub fn declaims(&self) -> Vec<String> {
        self.items.iter().map(|item| item.declaim()).collect()
    }

    fn mapper(&self) -> Result<crate::Mapper, SerialError> {
        crate::Recursive::mapper(&self.with_mapper).ok_or(SerialError::NoMapper {
            type_path: Self::type_path(),
        })
    }
}

impl Mappable for Shelf {
    fn push_to_map(&self, map: &mut AttrMap) -> Result<(), SerialError> {
        let mapper = self.mapper()?;
        push_fields(
            &ShelfFields {
                label: self.label.clone(),
            },
            map,
        )?;
        let items = self
            .items
            .iter()
            .map(|item| mapper.to_map(&**item).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        map.insert("items".into(), Value::Array(items));
        Ok(())
    }

    fn pull_from_map(&mut self, map: &AttrMap) -> Result<(), SerialError> {
        let mapper = self.mapper()?;
        let ShelfFields { label } = pull_fields(map)?;
        self.label = label;

        self.items.clear();
        if let Some(Value::Array(items)) = map.get("items") {
            for item in items {
                match item {
                    Value::Object(item) => self.items.push(mapper.from_map_as::<dyn Actor>(item)?),
                    other => return Err(SerialError::mapping(format_args!("bad item `{other}`"))),
                }
            }
        }
        Ok(())
    }
}

impl Serialize for Shelf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = AttrMap::new();
        self.push_to_map(&mut map).map_err(S::Error::custom)?;
        map.serialize(serializer)
    }
}

// -----------------------------------------------------------------------------
// Odd shapes

/// Has a field named like the type tag.
#[derive(Tagged, Serialize, Deserialize, Default, Debug)]
pub struct Scalar {
    #[serde(rename = "<type>", default)]
    pub tag: String,
    pub value: f64,
}

/// Encodes to a number instead of a map.
#[derive(Tagged, Serialize, Deserialize, Default, Debug)]
pub struct Opaque(pub i32);

/// Not visible outside the crate.
#[derive(Tagged, Serialize, Deserialize, Default, Debug)]
#[allow(dead_code, reason = "only used as a type")]
pub(crate) struct Hidden;

/// Claims the path of [`Alpha`].
#[derive(Tagged, Serialize, Deserialize, Default, Debug)]
#[tagged(type_path = "vc_serial::testing::Alpha")]
#[allow(dead_code, reason = "only used as a type")]
pub struct Impostor;

pub mod pkg {
    use serde::{Deserialize, Serialize};

    use crate::derive::Tagged;

    #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
    #[tagged(auto_register)]
    pub struct Widget {
        pub name: String,
    }
}

// -----------------------------------------------------------------------------
// Investments

#[cfg(feature = "json")]
pub use investments::*;

#[cfg(feature = "json")]
mod investments {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::sync::LazyLock;

    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::derive::Tagged;
    use crate::{Mapper, RegistryArc, Tagged, Wrapper};

    pub trait Investment: Tagged {
        fn value(&self) -> f64;
    }

    #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
    pub struct Stock {
        pub symbol: String,
        pub shares: u32,
        pub price: f64,
    }

    impl Investment for Stock {
        fn value(&self) -> f64 {
            f64::from(self.shares) * self.price
        }
    }

    #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
    pub struct Bond {
        pub source: String,
        pub units: u32,
        pub price: f64,
        pub interest: f32,
    }

    impl Investment for Bond {
        fn value(&self) -> f64 {
            f64::from(self.units) * self.price
        }
    }

    pub static INVESTMENTS: LazyLock<RegistryArc> = LazyLock::new(|| {
        let registry = RegistryArc::default();
        let mut guard = registry.write();
        guard.add_alias::<Stock>("inv").unwrap();
        guard.register::<Stock>().unwrap();
        guard.register::<Bond>().unwrap();
        guard.register_cast::<Stock, dyn Investment>(|stock| stock).unwrap();
        guard.register_cast::<Bond, dyn Investment>(|bond| bond).unwrap();
        drop(guard);
        registry
    });

    /// A concrete type whose fields are polymorphic, written through [`Wrapper`].
    #[derive(Default)]
    pub struct Account {
        pub favorite: Option<Box<dyn Investment>>,
        pub positions: Vec<Box<dyn Investment>>,
        pub lookup: BTreeMap<String, Box<dyn Investment>>,
    }

    #[derive(Serialize, Deserialize)]
    struct AccountWire {
        #[serde(rename = "Favorite")]
        favorite: Option<Wrapper>,
        #[serde(rename = "Positions")]
        positions: Vec<Wrapper>,
        #[serde(rename = "Lookup")]
        lookup: BTreeMap<String, Wrapper>,
    }

    impl Account {
        pub fn total(&self) -> f64 {
            self.positions.iter().map(|position| position.value()).sum()
        }
    }

    impl Serialize for Account {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mapper = Mapper::new(INVESTMENTS.clone());
            let wrap = |investment: &Box<dyn Investment>| Wrapper::wrap(&mapper, &**investment);

            let wire = AccountWire {
                favorite: self.favorite.as_ref().map(wrap).transpose().map_err(S::Error::custom)?,
                positions: self
                    .positions
                    .iter()
                    .map(wrap)
                    .collect::<Result<_, _>>()
                    .map_err(S::Error::custom)?,
                lookup: self
                    .lookup
                    .iter()
                    .map(|(key, investment)| -> Result<_, crate::SerialError> {
                        Ok((key.clone(), wrap(investment)?))
                    })
                    .collect::<Result<_, crate::SerialError>>()
                    .map_err(S::Error::custom)?,
            };
            wire.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Account {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let wire = AccountWire::deserialize(deserializer)?;
            let mapper = Mapper::new(INVESTMENTS.clone());
            let unwrap = |wrapper: &Wrapper| wrapper.unwrap_as::<dyn Investment>(&mapper);

            Ok(Account {
                favorite: wire.favorite.as_ref().map(unwrap).transpose().map_err(D::Error::custom)?,
                positions: wire
                    .positions
                    .iter()
                    .map(unwrap)
                    .collect::<Result<_, _>>()
                    .map_err(D::Error::custom)?,
                lookup: wire
                    .lookup
                    .iter()
                    .map(|(key, wrapper)| -> Result<_, crate::SerialError> {
                        Ok((key.clone(), unwrap(wrapper)?))
                    })
                    .collect::<Result<_, crate::SerialError>>()
                    .map_err(D::Error::custom)?,
            })
        }
    }
}
