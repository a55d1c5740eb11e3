use verdict_core::{
    Args, ArgsMut, Candidate, DefaultRulesEngine, Facts, MethodBody, MethodDecl, Rule,
    RuleAdapter, RuleBuilder, RuleDeclaration, RuleError, RuleMetadata, RuleSet, RulesEngine,
    condition,
};

/// Greets in English and then in Chinese when a name is known
struct HelloRule;

impl RuleDeclaration for HelloRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new("hello rule").with_description("say hello").with_priority(1)
    }

    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::condition("has_name", |_: &Self, args: &Args<'_>| {
                Ok(args.get_str(0).is_some_and(|name| !name.is_empty()))
            })
            .fact("name"),
            MethodDecl::action("greet_in_chinese", 2, |_: &Self, args: &mut ArgsMut<'_>| {
                let greeting = format!("你好, {}", args.get_str(0).unwrap_or_default());
                if let Some(facts) = args.facts_mut() {
                    facts.put("chinese_greeting", greeting);
                }
                Ok(())
            })
            .fact("chinese_name")
            .facts(),
            MethodDecl::action("greet", 1, |_: &Self, args: &mut ArgsMut<'_>| {
                let greeting = format!("hello, {}", args.get_str(1).unwrap_or_default());
                let Some(facts) = args.facts_mut() else {
                    anyhow::bail!("greet needs the fact store");
                };
                facts.put("greeting", greeting);
                Ok(())
            })
            .facts()
            .fact("name"),
            MethodDecl::new(
                "audit",
                MethodBody::Predicate(Box::new(|_: &Self, args: &Args<'_>| {
                    Ok(args.facts().is_some_and(|facts| facts.contains("greeting")))
                })),
            ),
        ]
    }
}

#[test]
fn hello_rule_greets_in_action_order() {
    let mut rules = RuleSet::new();
    assert!(rules.register_declared(HelloRule).unwrap());

    let mut facts = Facts::new();
    facts.put("name", "Mahmoud");
    facts.put("chinese_name", "马哈茂德");
    DefaultRulesEngine::new().fire(&rules, &mut facts);

    assert_eq!(facts.get_str("greeting"), Some("hello, Mahmoud"));
    assert_eq!(facts.get_str("chinese_greeting"), Some("你好, 马哈茂德"));
}

#[test]
fn adapted_rule_exposes_metadata_and_identity() {
    let adapted = RuleAdapter::adapt(Candidate::declared(HelloRule)).unwrap();
    assert_eq!(adapted.name(), "hello rule");
    assert_eq!(adapted.description(), "say hello");
    assert_eq!(adapted.priority(), 1);
    assert_eq!(adapted.to_string(), "Rule{name='hello rule', priority=1, description='say hello'}");

    let native: Box<dyn Rule> = Box::new(
        RuleBuilder::new()
            .name("hello rule")
            .description("something else")
            .priority(1)
            .when(condition::never)
            .build(),
    );
    assert!(*adapted == *native);
}

#[test]
fn declared_and_native_rules_share_one_set() {
    let mut rules = RuleSet::new();
    assert!(rules.register_declared(HelloRule).unwrap());
    let duplicate: Box<dyn Rule> =
        Box::new(RuleBuilder::new().name("hello rule").priority(1).when(condition::always).build());
    assert!(!rules.register_candidate(Candidate::from(duplicate)).unwrap());
    assert_eq!(rules.len(), 1);
}

#[test]
fn absent_name_fails_the_action_binding() {
    let rule = RuleAdapter::adapt_declared(HelloRule).unwrap();
    let mut facts = Facts::new();
    facts.put("name", "Mahmoud");

    assert!(rule.evaluate(&facts).unwrap());
    let err = rule.execute(&mut facts).unwrap_err();
    let cause = err.downcast_ref::<RuleError>().unwrap();
    assert_eq!(cause.missing_fact(), Some("chinese_name"));
    assert!(format!("{err:#}").contains("greet_in_chinese"));
    // `greet` ran before the failing action
    assert_eq!(facts.get_str("greeting"), Some("hello, Mahmoud"));
}

#[test]
fn malformed_declaration_is_a_configuration_error() {
    struct Unconditional;
    impl RuleDeclaration for Unconditional {
        fn methods() -> Vec<MethodDecl<Self>> {
            vec![MethodDecl::action("shout", 0, |_: &Self, _: &mut ArgsMut<'_>| Ok(()))]
        }
    }

    let mut rules = RuleSet::new();
    let err = rules.register_declared(Unconditional).unwrap_err();
    assert_eq!(err.category(), "configuration");
    assert!(!err.is_recoverable());
    assert!(rules.is_empty());
}
