use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::container::{
    Container, ContainerError, RegistrationPolicy, ServiceFactory, ServiceId, ServiceRegistry, ValueFactory,
    factory_fn,
};
use crate::kernel::error::{Error, Result};

struct CountingFactory {
    calls: Arc<AtomicU32>,
    value: &'static str,
}

impl ServiceFactory for CountingFactory {
    type Output = String;

    fn build(&self, _container: &Container) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.to_string())
    }
}

#[test]
fn test_service_id_qualification() {
    let id = ServiceId::qualified("files", "TagService");
    assert_eq!(id.as_str(), "files::TagService");
    assert_eq!(id.namespace(), Some("files"));
    assert_eq!(id.local_name(), "TagService");
    assert!(id.is_qualified());

    // Already-qualified names are kept verbatim
    let other = ServiceId::qualified("files", "comments::Manager");
    assert_eq!(other.as_str(), "comments::Manager");

    // The host namespace is empty, identifiers there stay unqualified
    let host = ServiceId::qualified("", "Dispatcher");
    assert_eq!(host.as_str(), "Dispatcher");
    assert!(!host.is_qualified());
    assert_eq!(host.namespace(), None);
    assert_eq!(host.local_name(), "Dispatcher");
}

#[test]
fn test_register_does_not_construct() -> Result<()> {
    let registry = ServiceRegistry::new("files");
    let calls = Arc::new(AtomicU32::new(0));

    let id = registry.register_factory(
        "TagService",
        CountingFactory { calls: calls.clone(), value: "tags" },
    )?;

    assert_eq!(id.as_str(), "files::TagService");
    assert!(registry.contains("TagService"));
    assert!(registry.contains("files::TagService"));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "Registration must not invoke the factory");
    Ok(())
}

#[test]
fn test_ids_are_sorted_and_qualified() -> Result<()> {
    let registry = ServiceRegistry::new("files");
    registry.register_factory("TagService", ValueFactory(1u32))?;
    registry.register_factory("APIController", ValueFactory(2u32))?;

    let ids: Vec<String> = registry.ids()?.iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["files::APIController", "files::TagService"]);
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
    Ok(())
}

#[test]
fn test_reregistration_overwrites_by_default() -> Result<()> {
    let registry = Arc::new(ServiceRegistry::new("files"));
    assert_eq!(registry.policy(), RegistrationPolicy::Overwrite);

    let first_calls = Arc::new(AtomicU32::new(0));
    let second_calls = Arc::new(AtomicU32::new(0));
    registry.register_factory("X", CountingFactory { calls: first_calls.clone(), value: "first" })?;
    registry.register_factory("X", CountingFactory { calls: second_calls.clone(), value: "second" })?;
    assert_eq!(registry.len(), 1);

    let container = Container::new(registry);
    let value = container.resolve_as::<String>("X")?;
    assert_eq!(value.as_str(), "second");
    assert_eq!(first_calls.load(Ordering::SeqCst), 0, "Replaced factory must never run");
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_strict_policy_rejects_duplicates() -> Result<()> {
    let registry = ServiceRegistry::with_policy("files", RegistrationPolicy::Strict);
    registry.register_factory("X", ValueFactory(1u32))?;

    let result = registry.register_factory("X", ValueFactory(2u32));
    match result {
        Err(Error::Container(ContainerError::DuplicateService { id })) => {
            assert_eq!(id.as_str(), "files::X");
        }
        other => panic!("Expected DuplicateService, got {:?}", other),
    }

    // The original factory is still in place
    let container = Container::new(Arc::new(registry));
    assert_eq!(*container.resolve_as::<u32>("X")?, 1);
    Ok(())
}

#[test]
fn test_strict_policy_rejects_duplicate_types() -> Result<()> {
    let registry = ServiceRegistry::with_policy("", RegistrationPolicy::Strict);
    registry.register_type::<String, _>(|_| Ok(Arc::new("a".to_string())))?;
    assert!(registry.contains_type::<String>());

    let err = registry
        .register_type::<String, _>(|_| Ok(Arc::new("b".to_string())))
        .expect_err("Second registration of the same type should fail");
    assert!(matches!(
        err,
        Error::Container(ContainerError::DuplicateService { .. })
    ));
    Ok(())
}

#[test]
fn test_policy_from_strict_flag() {
    assert_eq!(RegistrationPolicy::from_strict(true), RegistrationPolicy::Strict);
    assert_eq!(RegistrationPolicy::from_strict(false), RegistrationPolicy::Overwrite);
    assert_eq!(RegistrationPolicy::default(), RegistrationPolicy::Overwrite);
}

#[test]
fn test_closure_factory() -> Result<()> {
    let registry = Arc::new(ServiceRegistry::new("files"));
    registry.register_factory("Greeting", factory_fn(|_c: &Container| Ok(String::from("hello"))))?;

    let container = Container::new(registry);
    assert_eq!(container.resolve_as::<String>("Greeting")?.as_str(), "hello");
    Ok(())
}
