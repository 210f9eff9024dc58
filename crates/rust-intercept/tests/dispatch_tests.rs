//! Dispatch tests.
//!
//! Tests for behavior ordering, handler fallback, configuration errors and
//! reset, driven through a plain function with a real fallback body.

use std::sync::Arc;

use rust_intercept::prelude::*;
use rust_intercept::testing::assert_panics_with;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Request {
    value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Response {
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceError(String);

type GetResult = std::result::Result<Response, ServiceError>;

fn response(message: &str) -> GetResult {
    Ok(Response {
        message: message.to_string(),
    })
}

/// Mockable function; the closure passed to `call_or` is the real body.
fn get(manager: Option<&Manager>, req: &Request) -> GetResult {
    let (result,) = call_or(
        manager,
        &CallSite::function(get),
        Args::new(&args![req]),
        || (response("9:xxx"),),
    );
    result
}

fn mock_get(manager: &Manager) -> Mocker1<Request, (GetResult,)> {
    Mocker1::for_fn(manager, get)
}

fn req(value: u32) -> Request {
    Request { value }
}

// =============================================================================
// Conditional behaviors
// =============================================================================

#[test]
fn conditional_records_pick_by_argument() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value == 5)
        .returns(|| (response("1:abc"),));
    mock_get(&manager)
        .when(|req| req.value == 10)
        .returns(|| (response("3:xyz"),));

    assert_eq!(get(Some(&manager), &req(5)), response("1:abc"));
    assert_eq!(get(Some(&manager), &req(10)), response("3:xyz"));
    assert_eq!(get(Some(&manager), &req(15)), response("9:xxx"));
}

#[test]
fn earliest_matching_record_wins() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value > 3)
        .returns_values((response("first"),));
    mock_get(&manager)
        .when(|req| req.value > 1)
        .returns_values((response("second"),));

    assert_eq!(get(Some(&manager), &req(4)), response("first"));
    assert_eq!(get(Some(&manager), &req(2)), response("second"));
}

#[test]
fn errors_can_be_mocked() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value == 0)
        .returns(|| (Err(ServiceError("empty request".into())),));

    assert_eq!(
        get(Some(&manager), &req(0)),
        Err(ServiceError("empty request".into()))
    );
}

#[test]
fn ignore_returns_default_results() {
    fn inspect(manager: Option<&Manager>, req: &Request) -> (u32, bool) {
        call_or(manager, &CallSite::function(inspect), Args::new(&args![req]), || {
            (req.value, true)
        })
    }

    let manager = Manager::new();
    assert_eq!(inspect(Some(&manager), &req(3)), (3, true));

    Mocker1::<Request, (u32, bool)>::for_fn(&manager, inspect).ignore();
    assert_eq!(inspect(Some(&manager), &req(3)), (0, false));
}

// =============================================================================
// Handlers
// =============================================================================

#[test]
fn handler_sees_every_call() {
    let manager = Manager::new();
    mock_get(&manager).handle(|req| (response(&format!("handled {}", req.value)),));

    assert_eq!(get(Some(&manager), &req(1)), response("handled 1"));
    assert_eq!(get(Some(&manager), &req(2)), response("handled 2"));
}

#[test]
fn conditional_match_takes_precedence_over_handler() {
    let manager = Manager::new();
    mock_get(&manager).handle(|_| (response("handler"),));
    mock_get(&manager)
        .when(|req| req.value == 5)
        .returns_values((response("conditional"),));

    assert_eq!(get(Some(&manager), &req(5)), response("conditional"));
    assert_eq!(get(Some(&manager), &req(6)), response("handler"));
}

#[test]
fn duplicate_handler_panics_with_label() {
    let manager = Manager::new();
    mock_get(&manager).handle(|_| (response("a"),));
    mock_get(&manager).handle(|_| (response("b"),));

    let message = assert_panics_with(
        || get(Some(&manager), &req(1)),
        "duplicate handler registered for",
    );
    assert!(message.contains("dispatch_tests::get"));
}

#[test]
fn conditional_match_wins_even_with_duplicate_handlers_later() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value == 1)
        .returns_values((response("early"),));
    mock_get(&manager).handle(|_| (response("a"),));
    mock_get(&manager).handle(|_| (response("b"),));

    assert_eq!(get(Some(&manager), &req(1)), response("early"));
    assert_panics_with(|| get(Some(&manager), &req(2)), "duplicate handler");
}

#[test]
fn declining_handler_runs_real_code() {
    let manager = Manager::new();
    mock_get(&manager).try_handle(|req| (req.value < 10).then(|| (response("small"),)));

    assert_eq!(get(Some(&manager), &req(3)), response("small"));
    assert_eq!(get(Some(&manager), &req(30)), response("9:xxx"));
}

#[test]
fn absent_handler_is_not_handled() {
    let manager = Manager::new();
    mock_get(&manager).handle_opt(None::<fn(&Request) -> (GetResult,)>);

    assert_eq!(get(Some(&manager), &req(1)), response("9:xxx"));
}

#[test]
fn strict_modes_reject_mixing() {
    let manager = Manager::with_config(ManagerConfig::new().strict_modes(true));
    mock_get(&manager).handle(|_| (response("handler"),));
    mock_get(&manager).always().returns_values((response("conditional"),));

    assert_panics_with(|| get(Some(&manager), &req(1)), "strict modes");
}

// =============================================================================
// Unhandled calls and configuration errors
// =============================================================================

#[test]
fn no_manager_runs_real_code() {
    assert_eq!(get(None, &req(5)), response("9:xxx"));
}

#[test]
fn no_matching_record_runs_real_code() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value == 5)
        .returns_values((response("mocked"),));

    assert_eq!(get(Some(&manager), &req(6)), response("9:xxx"));
}

#[test]
fn matched_predicate_without_returns_panics() {
    let manager = Manager::new();
    let _mocker = mock_get(&manager).when(|_| true);

    assert_panics_with(|| get(Some(&manager), &req(1)), "has no return value");
}

#[test]
fn result_type_mismatch_panics() {
    let manager = Manager::new();
    Mocker1::<Request, (String,)>::for_fn(&manager, get).returns_values(("oops".to_string(),));

    assert_panics_with(|| get(Some(&manager), &req(1)), "return value 0");
}

#[test]
fn argument_type_mismatch_panics() {
    let manager = Manager::new();
    Mocker1::<u32, (GetResult,)>::for_fn(&manager, get).handle(|_| (response("never"),));

    assert_panics_with(|| get(Some(&manager), &req(1)), "argument 0");
}

// =============================================================================
// Reset and statistics
// =============================================================================

#[test]
fn reset_clears_all_behaviors() {
    let manager = Manager::new();
    let mocker = mock_get(&manager);
    mocker.returns_values((response("mocked"),));
    assert_eq!(get(Some(&manager), &req(1)), response("mocked"));

    manager.reset();
    assert_eq!(get(Some(&manager), &req(1)), response("9:xxx"));

    // Old handles are detached; registering again works.
    mocker.returns_values((response("stale"),));
    assert_eq!(get(Some(&manager), &req(1)), response("9:xxx"));
    mock_get(&manager).returns_values((response("fresh"),));
    assert_eq!(get(Some(&manager), &req(1)), response("fresh"));
}

#[test]
fn statistics_track_outcomes() {
    let manager = Manager::new();
    mock_get(&manager)
        .when(|req| req.value == 1)
        .returns_values((response("one"),));

    get(Some(&manager), &req(1)).unwrap();
    get(Some(&manager), &req(2)).unwrap();
    get(Some(&manager), &req(3)).unwrap();

    let stats = manager.stats();
    assert_eq!(stats.dispatches, 3);
    assert_eq!(stats.handled, 1);
    assert_eq!(stats.unhandled, 2);
    assert_eq!(stats.failures, 0);
}

#[test]
fn behaviors_are_listed_per_call_site() {
    let manager = Manager::new();
    mock_get(&manager).always().returns_values((response("a"),));
    mock_get(&manager).always().returns_values((response("b"),));

    let site = CallSite::function(get);
    assert_eq!(manager.behavior_count(&site), 2);
    assert_eq!(manager.call_sites(), vec![site.clone()]);
    assert!(
        manager
            .lookup(&site)
            .iter()
            .all(|b| b.mode() == Mode::Conditional)
    );
}

#[test]
fn shared_manager_in_arc() {
    let manager = Arc::new(Manager::new());
    mock_get(&manager).returns_values((response("shared"),));

    let clone = Arc::clone(&manager);
    assert_eq!(get(Some(&clone), &req(1)), response("shared"));
}
