//! # Workflow Engine — Property Tests
//!
//! Registry-level invariants checked over generated events and action lists:
//! - Condition-free triggers match on event type alone
//! - One false clause defeats the whole condition list
//! - Action results follow declared order
//! - Execution counts advance once per matched event
//! - Removed instances never run again

use juris_core::TemplateId;
use juris_workflow::{
    Action, Condition, ConditionOperator, DomainEvent, EngineConfig, HandlerRegistry, Trigger,
    TriggerType, WorkflowDefinition, WorkflowRegistry,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn registry() -> WorkflowRegistry {
    WorkflowRegistry::new(HandlerRegistry::tracing_only(), &EngineConfig::default())
}

fn trigger_type() -> impl Strategy<Value = TriggerType> {
    prop::sample::select(TriggerType::ALL.to_vec())
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,10}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z_]{1,8}", scalar(), 0..6).prop_map(|m| m.into_iter().collect())
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Action::assign_owner),
        "[a-z]{1,6}".prop_map(Action::tag),
        "[a-z]{1,6}".prop_map(Action::comment),
        "[a-z]{1,6}".prop_map(|s| Action::notify("responsavel", s)),
        "x_[a-z]{1,6}".prop_map(|t| Action::unregistered(t, Map::new())),
    ]
}

fn definition(id: &str, trigger: Trigger, actions: Vec<Action>) -> WorkflowDefinition {
    let mut def = WorkflowDefinition::new(TemplateId::new(id).unwrap(), id, trigger);
    def.actions = actions;
    def
}

fn event(event_type: TriggerType, entity: Map<String, Value>, context: Map<String, Value>) -> DomainEvent {
    DomainEvent::new(event_type)
        .with_entity(Value::Object(entity))
        .with_context(Value::Object(context))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A trigger without conditions matches exactly the events of its type.
    #[test]
    fn empty_conditions_match_by_type(
        declared in trigger_type(),
        fired in trigger_type(),
        entity in object(),
        context in object(),
    ) {
        let mut reg = registry();
        reg.activate(&definition("p1", Trigger::new(declared), vec![Action::tag("t")])).unwrap();

        let results = runtime().block_on(reg.handle(&event(fired, entity, context)));

        prop_assert_eq!(results.len(), 1);
        prop_assert_eq!(results[0].matched, declared == fired);
    }

    /// A single false clause, at any position, prevents the match.
    #[test]
    fn one_false_clause_prevents_match(
        entity in object(),
        position in 0usize..5,
    ) {
        let mut conditions: Vec<Condition> = entity
            .iter()
            .map(|(k, v)| Condition::new(k.clone(), ConditionOperator::Equal, v.clone()))
            .collect();
        let at = position.min(conditions.len());
        conditions.insert(at, Condition::new("9sempre_falso", ConditionOperator::Equal, true));
        let trigger = Trigger { trigger_type: TriggerType::StatusChanged, conditions };

        let mut reg = registry();
        let id = reg.activate(&definition("p2", trigger, vec![Action::tag("t")])).unwrap().id();
        let results = runtime().block_on(reg.handle(&event(TriggerType::StatusChanged, entity, Map::new())));

        prop_assert!(!results[0].matched);
        prop_assert_eq!(reg.get(id).unwrap().execution_count(), 0);
    }

    /// Result order mirrors declared order whatever succeeds or fails.
    #[test]
    fn results_mirror_declared_order(actions in prop::collection::vec(action(), 1..10)) {
        let expected: Vec<String> = actions.iter().map(|a| a.action_type().to_string()).collect();
        let mut reg = registry();
        reg.activate(&definition("p3", Trigger::new(TriggerType::CommentAdded), actions)).unwrap();

        let results = runtime().block_on(reg.handle(&DomainEvent::new(TriggerType::CommentAdded)));

        let got: Vec<String> = results[0].results.iter().map(|r| r.action_type.to_string()).collect();
        prop_assert_eq!(got, expected);
    }

    /// The execution count equals the number of matched events.
    #[test]
    fn count_equals_matched_events(
        days in prop::collection::vec(0i64..20, 0..15),
        actions in prop::collection::vec(action(), 1..4),
    ) {
        let trigger = Trigger::new(TriggerType::DeadlineApproaching).with_condition(Condition::new(
            "dias_restantes",
            ConditionOperator::LessOrEqual,
            7,
        ));
        let mut reg = registry();
        let id = reg.activate(&definition("p4", trigger, actions)).unwrap().id();
        let rt = runtime();

        let mut matched = 0u64;
        for d in &days {
            let mut context = Map::new();
            context.insert("dias_restantes".into(), Value::from(*d));
            let results = rt.block_on(reg.handle(&event(TriggerType::DeadlineApproaching, Map::new(), context)));
            if results[0].matched {
                matched += 1;
            }
        }

        let expected = days.iter().filter(|d| **d <= 7).count() as u64;
        prop_assert_eq!(matched, expected);
        prop_assert_eq!(reg.get(id).unwrap().execution_count(), expected);
    }

    /// Once removed, an instance never appears in results again.
    #[test]
    fn removed_instances_stay_gone(
        remove_after in 0usize..5,
        events in prop::collection::vec(trigger_type(), 1..10),
    ) {
        let mut reg = registry();
        let doomed = reg
            .activate(&definition("p5", Trigger::new(TriggerType::ProcessCreated), vec![Action::tag("t")]))
            .unwrap()
            .id();
        let survivor = reg
            .activate(&definition("p5-outro", Trigger::new(TriggerType::ProcessCreated), vec![Action::tag("t")]))
            .unwrap()
            .id();
        let rt = runtime();

        for (i, t) in events.iter().enumerate() {
            if i == remove_after {
                reg.remove(doomed).unwrap();
            }
            let results = rt.block_on(reg.handle(&DomainEvent::new(*t)));
            if i >= remove_after {
                prop_assert!(results.iter().all(|r| r.workflow_id != doomed));
                prop_assert!(results.iter().any(|r| r.workflow_id == survivor));
            }
        }
        prop_assert!(reg.get(doomed).is_none());
    }
}
