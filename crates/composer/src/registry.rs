//! Participator registration and lookup by request/response pair.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::error::RegistryError;
use crate::participator::Participator;

type PairKey = (TypeId, TypeId);
type ParticipatorList<Req, Resp> = Vec<Arc<dyn Participator<Req, Resp>>>;

/// Resolves the participators registered for a request/response pair.
pub trait ParticipatorLookup: Send + Sync {
    /// Returns the participators for the pair in registration order.
    fn lookup<Req, Resp>(&self) -> Vec<Arc<dyn Participator<Req, Resp>>>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static;
}

/// Registers the participators owned by one service.
pub trait Configurator {
    fn configure(&self, registry: &mut RegistryBuilder);
}

struct PairEntry {
    request: &'static str,
    response: &'static str,
    /// A `ParticipatorList<Req, Resp>` for the pair's types.
    participators: Box<dyn Any + Send + Sync>,
    implementors: Vec<(TypeId, &'static str)>,
}

impl PairEntry {
    fn new<Req, Resp>() -> Self
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        Self {
            request: std::any::type_name::<Req>(),
            response: std::any::type_name::<Resp>(),
            participators: Box::new(ParticipatorList::<Req, Resp>::new()),
            implementors: Vec::new(),
        }
    }
}

/// Collects participators before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<PairKey, PairEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a request/response pair without registering a participator.
    ///
    /// Declared pairs show up in [`ParticipatorRegistry::describe`] even when
    /// nothing implements them.
    pub fn declare<Req, Resp>(&mut self) -> &mut Self
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        self.entries
            .entry((TypeId::of::<Req>(), TypeId::of::<Resp>()))
            .or_insert_with(PairEntry::new::<Req, Resp>);
        self
    }

    /// Registers a participator for the pair `(Req, Resp)`.
    pub fn register<Req, Resp, P>(&mut self, participator: P) -> &mut Self
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
        P: Participator<Req, Resp> + 'static,
    {
        let entry = self
            .entries
            .entry((TypeId::of::<Req>(), TypeId::of::<Resp>()))
            .or_insert_with(PairEntry::new::<Req, Resp>);

        entry
            .implementors
            .push((TypeId::of::<P>(), participator.name()));
        if let Some(list) = entry
            .participators
            .downcast_mut::<ParticipatorList<Req, Resp>>()
        {
            list.push(Arc::new(participator));
        }
        self
    }

    /// Lets a service register all of its participators.
    pub fn add_configurator(&mut self, configurator: &dyn Configurator) -> &mut Self {
        configurator.configure(self);
        self
    }

    /// Freezes the registry, rejecting participator types registered twice
    /// for the same pair.
    pub fn build(self) -> Result<ParticipatorRegistry, RegistryError> {
        for entry in self.entries.values() {
            let mut seen = HashSet::new();
            for (type_id, name) in &entry.implementors {
                if !seen.insert(*type_id) {
                    return Err(RegistryError::DuplicateParticipator {
                        participator: *name,
                        request: entry.request,
                        response: entry.response,
                    });
                }
            }
        }

        Ok(ParticipatorRegistry {
            entries: self.entries,
        })
    }
}

/// A request/response pair and the participators registered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementorSet {
    pub request: &'static str,
    pub response: &'static str,
    pub participators: Vec<&'static str>,
}

/// Immutable participator registry built at process start.
pub struct ParticipatorRegistry {
    entries: HashMap<PairKey, PairEntry>,
}

impl ParticipatorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Lists every known pair with its participator names, sorted by pair
    /// and then by participator.
    pub fn describe(&self) -> Vec<ImplementorSet> {
        let mut sets: Vec<ImplementorSet> = self
            .entries
            .values()
            .map(|entry| {
                let mut participators: Vec<&'static str> =
                    entry.implementors.iter().map(|(_, name)| *name).collect();
                participators.sort_unstable();
                ImplementorSet {
                    request: entry.request,
                    response: entry.response,
                    participators,
                }
            })
            .collect();
        sets.sort_by(|a, b| (a.request, a.response).cmp(&(b.request, b.response)));
        sets
    }
}

impl ParticipatorLookup for ParticipatorRegistry {
    fn lookup<Req, Resp>(&self) -> Vec<Arc<dyn Participator<Req, Resp>>>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        self.entries
            .get(&(TypeId::of::<Req>(), TypeId::of::<Resp>()))
            .and_then(|entry| {
                entry
                    .participators
                    .downcast_ref::<ParticipatorList<Req, Resp>>()
            })
            .cloned()
            .unwrap_or_default()
    }
}

impl<L: ParticipatorLookup> ParticipatorLookup for Arc<L> {
    fn lookup<Req, Resp>(&self) -> Vec<Arc<dyn Participator<Req, Resp>>>
    where
        Req: Send + Sync + 'static,
        Resp: Send + Sync + 'static,
    {
        self.as_ref().lookup::<Req, Resp>()
    }
}
