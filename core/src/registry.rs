use super::*;
use crate::key::{KeyData, KeyStatus, KeyTemplate};
use crate::key_manager::KeyManager;
use crate::keyset::Keyset;
use crate::primitive_set::PrimitiveSet;
use crate::wrapper::PrimitiveWrapper;
use std::{
    any::{Any, TypeId, type_name},
    collections::{HashMap, hash_map::Entry},
    sync::RwLock,
};

type NewKeyFn = dyn Fn(&[u8]) -> Result<KeyData> + Send + Sync;

struct KeyManagerEntry {
    // Always an `Arc<dyn KeyManager<P>>` for the `P` named by `primitive_type`
    manager: Box<dyn Any + Send + Sync>,
    new_key: Arc<NewKeyFn>,
    manager_type: TypeId,
    manager_name: &'static str,
    primitive_type: TypeId,
    primitive_name: &'static str,
    new_key_allowed: bool,
}

struct WrapperEntry {
    // Always an `Arc<dyn PrimitiveWrapper<P>>` for the `P` the entry is keyed by
    wrapper: Box<dyn Any + Send + Sync>,
    wrapper_type: TypeId,
    wrapper_name: &'static str,
}

#[derive(Default)]
struct RegistryInner {
    key_managers: HashMap<String, KeyManagerEntry>,
    wrappers: HashMap<TypeId, WrapperEntry>,
}

/// Catalog of key managers, by key type, and primitive wrappers, by primitive category.
///
/// A primitive category is the capability trait object type, e.g. `dyn Mac`.
/// Registration normally happens once at start-up; lookups, [`wrap`](Self::wrap)
/// and keyset assembly may then run concurrently from any thread.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every registration.
    ///
    /// Only intended for isolating tests from one another.
    pub fn reset(&self) {
        let mut inner = self
            .inner
            .write()
            .trace_expect("Failed to write lock registry");
        inner.key_managers.clear();
        inner.wrappers.clear();
        debug!("Registry reset");
    }

    /// Registers `manager` for its key type.
    ///
    /// Registering the same manager type again is accepted, and may withdraw
    /// `new_key_allowed` but never grant it. A different manager for an already
    /// registered key type is rejected.
    pub fn register_key_manager<P, M>(&self, manager: M, new_key_allowed: bool) -> Result<()>
    where
        P: ?Sized + 'static,
        M: KeyManager<P> + 'static,
    {
        let key_type = manager.key_type().to_string();
        let mut inner = self
            .inner
            .write()
            .trace_expect("Failed to write lock registry");

        match inner.key_managers.entry(key_type.clone()) {
            Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                if existing.manager_type != TypeId::of::<M>()
                    || existing.primitive_type != TypeId::of::<P>()
                {
                    return Err(Error::KeyManagerExists {
                        key_type,
                        existing: existing.manager_name,
                    })
                    .trace_err("Conflicting key manager registration");
                }
                if new_key_allowed && !existing.new_key_allowed {
                    return Err(Error::NewKeyAllowedConflict(key_type))
                        .trace_err("Conflicting key manager registration");
                }
                existing.new_key_allowed = new_key_allowed;
                Ok(())
            }
            Entry::Vacant(e) => {
                info!(
                    "Registered key manager {} for key type {key_type}",
                    type_name::<M>()
                );

                let manager: Arc<dyn KeyManager<P>> = Arc::new(manager);
                let new_key: Arc<NewKeyFn> = {
                    let manager = manager.clone();
                    Arc::new(move |key_format: &[u8]| manager.new_key(key_format))
                };
                e.insert(KeyManagerEntry {
                    manager: Box::new(manager),
                    new_key,
                    manager_type: TypeId::of::<M>(),
                    manager_name: type_name::<M>(),
                    primitive_type: TypeId::of::<P>(),
                    primitive_name: type_name::<P>(),
                    new_key_allowed,
                });
                Ok(())
            }
        }
    }

    pub fn get_key_manager<P: ?Sized + 'static>(
        &self,
        key_type: &str,
    ) -> Result<Arc<dyn KeyManager<P>>> {
        let inner = self
            .inner
            .read()
            .trace_expect("Failed to read lock registry");
        let entry = inner
            .key_managers
            .get(key_type)
            .ok_or_else(|| Error::KeyManagerNotFound(key_type.to_string()))?;

        entry
            .manager
            .downcast_ref::<Arc<dyn KeyManager<P>>>()
            .cloned()
            .ok_or_else(|| Error::WrongPrimitive {
                key_type: key_type.to_string(),
                registered: entry.primitive_name,
                requested: type_name::<P>(),
            })
    }

    /// Registers `wrapper` for primitive category `P`.
    ///
    /// Registering the same wrapper type again is accepted, a different one is rejected.
    pub fn register_primitive_wrapper<P, W>(&self, wrapper: W) -> Result<()>
    where
        P: ?Sized + 'static,
        W: PrimitiveWrapper<P> + 'static,
    {
        let mut inner = self
            .inner
            .write()
            .trace_expect("Failed to write lock registry");

        match inner.wrappers.entry(TypeId::of::<P>()) {
            Entry::Occupied(e) => {
                if e.get().wrapper_type == TypeId::of::<W>() {
                    Ok(())
                } else {
                    Err(Error::WrapperExists {
                        primitive: type_name::<P>(),
                        existing: e.get().wrapper_name,
                    })
                    .trace_err("Conflicting primitive wrapper registration")
                }
            }
            Entry::Vacant(e) => {
                info!(
                    "Registered primitive wrapper {} for {}",
                    type_name::<W>(),
                    type_name::<P>()
                );

                let wrapper: Arc<dyn PrimitiveWrapper<P>> = Arc::new(wrapper);
                e.insert(WrapperEntry {
                    wrapper: Box::new(wrapper),
                    wrapper_type: TypeId::of::<W>(),
                    wrapper_name: type_name::<W>(),
                });
                Ok(())
            }
        }
    }

    /// Wraps `primitives` with the wrapper registered for category `P`.
    pub fn wrap<P: ?Sized + 'static>(&self, primitives: PrimitiveSet<P>) -> Result<Box<P>> {
        // Only hold the lock long enough to clone the wrapper
        let wrapper = {
            let inner = self
                .inner
                .read()
                .trace_expect("Failed to read lock registry");
            inner
                .wrappers
                .get(&TypeId::of::<P>())
                .and_then(|e| e.wrapper.downcast_ref::<Arc<dyn PrimitiveWrapper<P>>>())
                .cloned()
                .ok_or(Error::WrapperNotFound(type_name::<P>()))?
        };

        debug!(
            "Wrapping {} primitives as {}",
            primitives.len(),
            type_name::<P>()
        );
        wrapper.wrap(primitives)
    }

    /// Builds a primitive set holding one primitive per enabled key of `keyset`,
    /// with the keyset's primary key as primary.
    pub fn primitive_set<P: ?Sized + 'static>(&self, keyset: &Keyset) -> Result<PrimitiveSet<P>> {
        keyset.validate()?;

        let mut primitives = PrimitiveSet::new();
        for key in keyset
            .keys
            .iter()
            .filter(|k| k.status == KeyStatus::Enabled)
        {
            let manager = self.get_key_manager::<P>(&key.key_data.type_url)?;
            let entry =
                primitives.add_primitive(manager.primitive(&key.key_data)?, key.metadata())?;
            if key.key_id == keyset.primary_key_id {
                primitives.set_primary(&entry)?;
            }
        }

        debug!(
            "Built primitive set of {} keys, primary key {}",
            primitives.len(),
            keyset.primary_key_id
        );
        Ok(primitives)
    }

    /// Builds the composite primitive of category `P` for `keyset`.
    pub fn primitive<P: ?Sized + 'static>(&self, keyset: &Keyset) -> Result<Box<P>> {
        self.wrap(self.primitive_set::<P>(keyset)?)
    }

    /// Generates new key data as described by `template`.
    ///
    /// Fails if the key type's manager was registered without `new_key_allowed`.
    pub fn new_key_data(&self, template: &KeyTemplate) -> Result<KeyData> {
        let new_key = {
            let inner = self
                .inner
                .read()
                .trace_expect("Failed to read lock registry");
            let entry = inner
                .key_managers
                .get(&template.type_url)
                .ok_or_else(|| Error::KeyManagerNotFound(template.type_url.clone()))?;
            if !entry.new_key_allowed {
                return Err(Error::NewKeyForbidden(template.type_url.clone()));
            }
            entry.new_key.clone()
        };
        new_key(&template.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::OutputPrefixType;
    use crate::keyset::Key;
    use crate::test_util::*;

    fn echo_key(key_id: u32, status: KeyStatus, value: &[u8]) -> Key {
        Key {
            key_data: KeyData::new(ECHO_KEY_TYPE, value.to_vec()),
            key_id,
            status,
            output_prefix_type: OutputPrefixType::Tink,
        }
    }

    fn registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_key_manager::<dyn Echo, _>(EchoKeyManager, true)
            .expect("Failed to register key manager");
        registry
            .register_primitive_wrapper::<dyn Echo, _>(EchoWrapper)
            .expect("Failed to register wrapper");
        registry
    }

    #[test]
    fn key_manager_lookup() {
        let registry = Registry::new();
        let err = registry
            .get_key_manager::<dyn Echo>(ECHO_KEY_TYPE)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, true).unwrap();
        let manager = registry.get_key_manager::<dyn Echo>(ECHO_KEY_TYPE).unwrap();
        assert_eq!(manager.key_type(), ECHO_KEY_TYPE);
    }

    #[test]
    fn duplicate_registration() {
        let registry = registry();

        // Same manager again is fine
        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, true).unwrap();

        let err = registry
            .register_key_manager::<dyn Echo, _>(OtherEchoKeyManager, true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        // The original survives
        let manager = registry.get_key_manager::<dyn Echo>(ECHO_KEY_TYPE).unwrap();
        let primitive = manager
            .primitive(&KeyData::new(ECHO_KEY_TYPE, b"mine".to_vec()))
            .unwrap();
        assert_eq!(primitive.echo(), b"mine");
    }

    #[test]
    fn new_key_allowed_only_narrows() {
        let registry = Registry::new();
        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, true).unwrap();
        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, false).unwrap();

        let err = registry
            .register_key_manager::<dyn Echo, _>(EchoKeyManager, true)
            .unwrap_err();
        assert!(matches!(err, Error::NewKeyAllowedConflict(_)));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn wrong_primitive_category() {
        trait Other: Send + Sync {}

        let registry = registry();
        let err = registry
            .get_key_manager::<dyn Other>(ECHO_KEY_TYPE)
            .err()
            .unwrap();
        assert!(matches!(err, Error::WrongPrimitive { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn wrapper_registration() {
        let registry = Registry::new();

        let mut primitives = PrimitiveSet::<dyn Echo>::new();
        let entry = primitives
            .add_primitive(
                Box::new(EchoKey(b"primary".to_vec())),
                echo_key(1, KeyStatus::Enabled, b"primary").metadata(),
            )
            .unwrap();
        primitives.set_primary(&entry).unwrap();

        let err = registry.wrap(primitives).err().unwrap();
        assert!(matches!(err, Error::WrapperNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        registry.register_primitive_wrapper::<dyn Echo, _>(EchoWrapper).unwrap();
        registry.register_primitive_wrapper::<dyn Echo, _>(EchoWrapper).unwrap();
        let err = registry
            .register_primitive_wrapper::<dyn Echo, _>(OtherEchoWrapper)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let mut primitives = PrimitiveSet::<dyn Echo>::new();
        let entry = primitives
            .add_primitive(
                Box::new(EchoKey(b"primary".to_vec())),
                echo_key(1, KeyStatus::Enabled, b"primary").metadata(),
            )
            .unwrap();
        primitives.set_primary(&entry).unwrap();

        let wrapped = registry.wrap(primitives).unwrap();
        assert_eq!(wrapped.echo(), b"primary");
    }

    #[test]
    fn reset_discards_registrations() {
        let registry = registry();
        registry.get_key_manager::<dyn Echo>(ECHO_KEY_TYPE).unwrap();

        registry.reset();

        let err = registry
            .get_key_manager::<dyn Echo>(ECHO_KEY_TYPE)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = registry.wrap(PrimitiveSet::<dyn Echo>::new()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // And can be repopulated
        registry.register_key_manager::<dyn Echo, _>(OtherEchoKeyManager, false).unwrap();
    }

    #[test]
    fn primitive_from_keyset() {
        let registry = registry();
        let keyset = Keyset {
            primary_key_id: 2,
            keys: vec![
                echo_key(1, KeyStatus::Enabled, b"one"),
                echo_key(2, KeyStatus::Enabled, b"two"),
                echo_key(3, KeyStatus::Disabled, b"three"),
            ],
        };

        let primitives = registry.primitive_set::<dyn Echo>(&keyset).unwrap();
        assert_eq!(primitives.len(), 2);
        assert_eq!(primitives.primary().unwrap().key_id(), 2);
        assert!(primitives.all().iter().all(|e| e.key_id() != 3));

        let primitive = registry.primitive::<dyn Echo>(&keyset).unwrap();
        assert_eq!(primitive.echo(), b"two");
    }

    #[test]
    fn keyset_with_unknown_key_type() {
        let registry = registry();
        let mut unknown = echo_key(1, KeyStatus::Enabled, b"one");
        unknown.key_data.type_url = "test.Unknown".into();
        let keyset = Keyset {
            primary_key_id: 1,
            keys: vec![unknown],
        };

        let err = registry.primitive::<dyn Echo>(&keyset).err().unwrap();
        assert!(matches!(err, Error::KeyManagerNotFound(_)));
    }

    #[test]
    fn keyset_with_malformed_key() {
        let registry = registry();
        let keyset = Keyset {
            primary_key_id: 1,
            keys: vec![echo_key(1, KeyStatus::Enabled, b"")],
        };

        let err = registry.primitive::<dyn Echo>(&keyset).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn new_key_data() {
        let template = KeyTemplate::new(ECHO_KEY_TYPE, vec![24], OutputPrefixType::Tink);

        let registry = Registry::new();
        assert_eq!(
            registry.new_key_data(&template).unwrap_err().kind(),
            ErrorKind::NotFound
        );

        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, false).unwrap();
        assert!(matches!(
            registry.new_key_data(&template),
            Err(Error::NewKeyForbidden(_))
        ));

        let registry = Registry::new();
        registry.register_key_manager::<dyn Echo, _>(EchoKeyManager, true).unwrap();
        let key_data = registry.new_key_data(&template).unwrap();
        assert_eq!(key_data.type_url, ECHO_KEY_TYPE);
        assert_eq!(key_data.value.len(), 24);
    }

    #[test]
    fn concurrent_lookups() {
        let registry = registry();
        let keyset = Keyset {
            primary_key_id: 1,
            keys: vec![echo_key(1, KeyStatus::Enabled, b"shared")],
        };

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let primitive = registry.primitive::<dyn Echo>(&keyset).unwrap();
                        assert_eq!(primitive.echo(), b"shared");
                    }
                });
            }
        });
    }

    #[test]
    fn registration_alongside_lookups() {
        let registry = registry();
        let keyset = Keyset {
            primary_key_id: 1,
            keys: vec![echo_key(1, KeyStatus::Enabled, b"shared")],
        };

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..100 {
                    registry
                        .register_key_manager::<dyn Echo, _>(EchoKeyManager, true)
                        .unwrap();
                    registry
                        .register_primitive_wrapper::<dyn Echo, _>(EchoWrapper)
                        .unwrap();
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let primitive = registry.primitive::<dyn Echo>(&keyset).unwrap();
                        assert_eq!(primitive.echo(), b"shared");
                    }
                });
            }
        });

        assert!(registry.new_key_data(&KeyTemplate::new(
            ECHO_KEY_TYPE,
            vec![16],
            OutputPrefixType::Raw
        ))
        .is_ok());
    }
}
