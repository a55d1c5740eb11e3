//! Rule sets behind the tutorial commands

use crate::cli::Tutorial;
use tracing::info;
use verdict_prelude::{
    Args, ArgsMut, DefaultRulesEngine, Facts, InferenceRulesEngine, MethodDecl, RuleBuilder,
    RuleDeclaration, RuleMetadata, RuleResult, RuleSet, RulesEngine, RulesEngineParameters,
    TracingRuleListener,
};

pub const UMBRELLA_ADVICE: &str = "It rains, take an umbrella!";
/// Above this temperature the air conditioning kicks in
pub const HOT_THRESHOLD: i64 = 25;

/// The rain rule, written with the builder
pub fn weather_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new()
            .name("weather rule")
            .description("if it rains then take an umbrella")
            .priority(1)
            .when(|facts: &Facts| Ok(facts.get_bool("rain") == Some(true)))
            .then(|facts: &mut Facts| {
                info!("{UMBRELLA_ADVICE}");
                facts.put("advice", UMBRELLA_ADVICE);
                Ok(())
            })
            .build(),
    );
    rules
}

/// Declared rule greeting whoever `name` is, then again in Chinese
pub struct HelloRule;

impl RuleDeclaration for HelloRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new("hello rule")
            .with_description("say hello in two languages")
            .with_priority(1)
    }

    fn methods() -> Vec<MethodDecl<Self>> {
        vec![
            MethodDecl::condition("knows_name", |_: &Self, args: &Args<'_>| {
                Ok(args.get_str(0).is_some_and(|name| !name.trim().is_empty()))
            })
            .fact("name"),
            MethodDecl::action("greet", 1, |_: &Self, args: &mut ArgsMut<'_>| {
                let greeting = format!("hello, {}", args.get_str(0).unwrap_or_default());
                store(args)?.put("greeting", greeting);
                Ok(())
            })
            .fact("name")
            .facts(),
            MethodDecl::action("greet_in_chinese", 2, |_: &Self, args: &mut ArgsMut<'_>| {
                let greeting = format!("你好, {}", args.get_str(0).unwrap_or_default());
                store(args)?.put("chinese_greeting", greeting);
                Ok(())
            })
            .fact("chinese_name")
            .facts(),
        ]
    }
}

fn store<'a>(args: &'a mut ArgsMut<'_>) -> anyhow::Result<&'a mut Facts> {
    args.facts_mut().ok_or_else(|| anyhow::anyhow!("action declared without a fact store parameter"))
}

pub fn hello_rules() -> RuleResult<RuleSet> {
    let mut rules = RuleSet::new();
    rules.register_declared(HelloRule)?;
    Ok(rules)
}

/// Decrease the temperature by one degree while it is hot
pub fn airco_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new()
            .name("air conditioning rule")
            .when(|facts: &Facts| {
                Ok(facts.get_integer("temperature").is_some_and(|t| t > HOT_THRESHOLD))
            })
            .then(|facts: &mut Facts| {
                let temperature = facts.get_integer("temperature").unwrap_or_default();
                facts.put("temperature", temperature - 1);
                Ok(())
            })
            .build(),
    );
    rules
}

/// Fire the rule set of `tutorial` against `facts` with the engine that tutorial uses
pub fn run(
    tutorial: Tutorial,
    parameters: RulesEngineParameters,
    facts: &mut Facts,
) -> RuleResult<()> {
    info!(?tutorial, %facts, "Running tutorial");
    match tutorial {
        Tutorial::Weather => single_pass(parameters).fire(&weather_rules(), facts),
        Tutorial::Hello => single_pass(parameters).fire(&hello_rules()?, facts),
        Tutorial::Airco => {
            let mut engine = InferenceRulesEngine::with_parameters(parameters);
            engine.register_rule_listener(TracingRuleListener);
            engine.register_engine_listener(TracingRuleListener);
            engine.fire(&airco_rules(), facts);
        }
    }
    info!(%facts, "Tutorial done");
    Ok(())
}

fn single_pass(parameters: RulesEngineParameters) -> DefaultRulesEngine {
    let mut engine = DefaultRulesEngine::with_parameters(parameters);
    engine.register_rule_listener(TracingRuleListener);
    engine.register_engine_listener(TracingRuleListener);
    engine
}
