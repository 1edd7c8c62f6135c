//! A task name may be registered as an operator or as a method, never both.
//!
//! The planner resolves a name to exactly one kind; registering the other
//! kind under the same name is a configuration error reported at declaration
//! time, before any search runs.

use htn_kernel::carrier::task::Task;
use htn_kernel::operators::domain::{DomainError, TaskKind};
use htn_kernel::operators::method_registry::Method;
use htn_kernel::operators::operator_registry::Operator;
use lock_tests::{travel_domain, TravelState};

#[test]
fn method_named_like_operator_is_rejected() {
    let mut domain = travel_domain();
    let err = domain
        .declare_methods(
            "walk",
            [Method::new("walk_twice", |_: &TravelState, _: &[String]| {
                Ok(Vec::<Task<String>>::new())
            })],
        )
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::AmbiguousTaskName {
            name: "walk".into(),
            existing: TaskKind::Primitive,
        }
    );
    assert!(domain.methods().resolve("walk").is_none());
}

#[test]
fn operator_named_like_method_is_rejected() {
    let mut domain = travel_domain();
    let err = domain
        .declare_operators([Operator::new("travel", |s: TravelState, _: &[String]| Ok(s))])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "task name \"travel\" is already registered as a method"
    );
    assert!(!domain.operators().contains("travel"));
}
