//! End-to-end tests for pipeline execution.

#[cfg(test)]
mod tests {
    use crate::checks::{CustomCheck, NumericConstraint};
    use crate::contract::{Contract, FieldBuilder};
    use crate::errors::StrictError;
    use crate::events::{types, CollectingEventSink};
    use crate::params;
    use crate::pipeline::{
        CallbackConfig, FallbackConfig, Halt, MockCallback, MockFallback, MockOperation, Pipeline,
        PipelineBuilder, PipelineResult, ProcessContext, Reply, ResultStatus,
    };
    use crate::policy::{Policy, PolicyRegistry};
    use crate::value::{FieldName, ParamsMap, Value};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn echo(_: &ProcessContext, params: ParamsMap) -> Result<Reply, Halt> {
        Ok(params.into())
    }

    fn scenario_contract() -> Contract {
        Contract::builder()
            .field(FieldBuilder::new("a").required().type_of("integer").default(1))
            .field(
                FieldBuilder::new("b")
                    .required()
                    .type_of("integer")
                    .numericality([NumericConstraint::greater_than(0)]),
            )
            .build()
            .unwrap()
    }

    fn parse_int((_, value): (&FieldName, &Value), _: &ParamsMap) -> Result<Value, Value> {
        match value {
            Value::Str(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Value::atom("not_an_integer")),
            other => Ok(other.clone()),
        }
    }

    #[test]
    fn test_defaults_fill_required_field() {
        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(echo)
            .build()
            .unwrap();

        let result = pipeline.run(params! { "b" => 5 });
        assert_eq!(result, PipelineResult::ok(params! { "b" => 5, "a" => 1 }));
    }

    #[test]
    fn test_validation_error_collects_messages() {
        let contract = Contract::builder()
            .field(
                FieldBuilder::new("b")
                    .type_of("integer")
                    .numericality([NumericConstraint::greater_than(0)]),
            )
            .build()
            .unwrap();
        let pipeline = PipelineBuilder::new("check")
            .contract(contract)
            .process(echo)
            .build()
            .unwrap();

        let result = pipeline.run(params! { "b" => "x" });
        let errors = result.field_errors().unwrap();
        assert_eq!(
            errors.messages(&FieldName::str("b")).unwrap(),
            &[
                "has wrong type; expected integer, got \"x\"".to_string(),
                "not a number".to_string()
            ]
        );
    }

    #[test]
    fn test_business_logic_sees_only_declared_fields() {
        let mut operation = MockOperation::new();
        operation
            .expect_process()
            .times(1)
            .returning(|_, params| {
                assert_eq!(params, params! { "b" => 2, "a" => 1 });
                Ok(Reply::ok(Value::Bool(true)))
            });

        let pipeline = PipelineBuilder::new("declared")
            .contract(scenario_contract())
            .operation(operation)
            .build()
            .unwrap();

        let result = pipeline.run(params! { "extra" => "ignored", "b" => 2 });
        assert_eq!(result, PipelineResult::ok(true));
    }

    #[test]
    fn test_validation_failure_skips_business_logic() {
        let mut operation = MockOperation::new();
        operation.expect_process().never();

        let pipeline = PipelineBuilder::new("guarded")
            .contract(scenario_contract())
            .operation(operation)
            .build()
            .unwrap();

        assert_eq!(pipeline.run(ParamsMap::new()).status(), ResultStatus::ValidationError);
    }

    #[test]
    fn test_coercion_repairs_invalid_value() {
        let contract = Contract::builder()
            .field(FieldBuilder::new("n").required().type_of("integer").coerce_with(parse_int))
            .build()
            .unwrap();
        let pipeline = PipelineBuilder::new("coerce")
            .contract(contract)
            .process(echo)
            .build()
            .unwrap();

        assert_eq!(pipeline.run(params! { "n" => "42" }), PipelineResult::ok(params! { "n" => 42 }));
    }

    #[test]
    fn test_coercion_failure_skips_validation_logic_and_fallback() {
        let contract = Contract::builder()
            .field(FieldBuilder::new("n").coerce_with(parse_int))
            .build()
            .unwrap();
        let mut operation = MockOperation::new();
        operation.expect_process().never();
        let mut fallback = MockFallback::new();
        fallback.expect_handle().never();

        let pipeline = PipelineBuilder::new("coerce")
            .contract(contract)
            .operation(operation)
            .fallback(fallback, FallbackConfig::take_over())
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run(params! { "n" => "x" }),
            PipelineResult::process(Value::atom("not_an_integer"))
        );
    }

    #[test]
    fn test_coercion_and_defaults_see_received_params() {
        let contract = Contract::builder()
            .field(FieldBuilder::new(FieldName::atom("total")).from("sum").coerce_with(|(_, v), received| {
                let bonus = received
                    .get(&FieldName::str("bonus"))
                    .and_then(Value::as_number)
                    .map_or(0, |n| n.as_f64() as i64);
                match v {
                    Value::Int(n) => Ok(Value::Int(n + bonus)),
                    other => Err(other.clone()),
                }
            }))
            .field(FieldBuilder::new("bonus").default(0))
            .build()
            .unwrap();
        let pipeline = PipelineBuilder::new("alias")
            .contract(contract)
            .process(echo)
            .build()
            .unwrap();

        let result = pipeline.run(params! { "sum" => 10, "bonus" => 5 });
        assert_eq!(
            result,
            PipelineResult::ok(params! { FieldName::atom("total") => 15, "bonus" => 5 })
        );
    }

    #[test]
    fn test_error_reply_is_process_error() {
        let pipeline = PipelineBuilder::new("fails")
            .process(|_, _| Ok(Reply::error(Value::tuple([Value::atom("db"), Value::from("down")]))))
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run(ParamsMap::new()),
            PipelineResult::process(Value::tuple([Value::atom("db"), Value::from("down")]))
        );
    }

    #[test]
    fn test_interrupt_is_not_an_error() {
        let pipeline = PipelineBuilder::new("stops")
            .process(|ctx, _| ctx.interrupt(Value::atom("paused")))
            .build()
            .unwrap();

        let result = pipeline.run(ParamsMap::new());
        assert_eq!(result, PipelineResult::interrupt(Value::atom("paused")));
        assert!(!result.is_error());
        assert_eq!(pipeline.run_strict(ParamsMap::new()).unwrap(), result);
    }

    #[test]
    fn test_interrupt_reaches_take_over_fallback() {
        let mut fallback = MockFallback::new();
        fallback
            .expect_handle()
            .times(1)
            .returning(|pipeline, _, result| {
                assert_eq!(pipeline, "stops");
                assert_eq!(result, &PipelineResult::interrupt(Value::atom("paused")));
                PipelineResult::ok("resumed")
            });

        let pipeline = PipelineBuilder::new("stops")
            .process(|ctx, _| ctx.interrupt(Value::atom("paused")))
            .fallback(fallback, FallbackConfig::take_over())
            .build()
            .unwrap();

        assert_eq!(pipeline.run(ParamsMap::new()), PipelineResult::ok("resumed"));
    }

    #[test]
    fn test_interrupt_kept_with_side_effect_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let pipeline = PipelineBuilder::new("stops")
            .process(|ctx, _| ctx.interrupt(Value::atom("paused")))
            .fallback(
                move |_: &str, _: &ParamsMap, _: &PipelineResult| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    PipelineResult::opaque("ignored")
                },
                FallbackConfig::side_effect(),
            )
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run(ParamsMap::new()),
            PipelineResult::interrupt(Value::atom("paused"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_custom_denial_reason() {
        let registry = Arc::new(PolicyRegistry::new());
        registry.register(Policy::new("accounts").action("close", |_| Value::atom("banned")));
        let reached = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reached);

        let pipeline = PipelineBuilder::new("close_account")
            .policy_registry(registry)
            .policy("accounts")
            .action("close")
            .process(move |ctx, _| {
                ctx.authorize(&Value::atom("user"))?;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Reply::ok(Value::Bool(true)))
            })
            .build()
            .unwrap();

        assert_eq!(pipeline.run(ParamsMap::new()), PipelineResult::auth(Value::atom("banned")));
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_policy_false_denies_with_action_name() {
        let pipeline = PipelineBuilder::new("edit")
            .attach_policy(Policy::new("posts").action("edit", |ctx| {
                Value::Bool(ctx.as_fields().is_some_and(|f| f.contains_key(&FieldName::atom("admin"))))
            }))
            .action("edit")
            .process(|ctx, params| {
                ctx.authorize(&Value::Map(params))?;
                Ok(Reply::ok("edited"))
            })
            .contract(
                Contract::builder()
                    .field(FieldBuilder::new(FieldName::atom("admin")))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(pipeline.run(ParamsMap::new()), PipelineResult::auth(Value::atom("edit")));
        assert_eq!(
            pipeline.run(params! { FieldName::atom("admin") => true }),
            PipelineResult::ok("edited")
        );
    }

    #[test]
    fn test_authorize_without_policy() {
        let pipeline = PipelineBuilder::new("open")
            .process(|ctx, _| {
                ctx.authorize(&Value::Null)?;
                Ok(Reply::ok(1))
            })
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run(ParamsMap::new()),
            PipelineResult::auth(Value::atom("undefined_policy"))
        );
    }

    #[test]
    fn test_fallback_take_over_replaces_result() {
        let mut fallback = MockFallback::new();
        fallback
            .expect_handle()
            .times(1)
            .returning(|pipeline, params, error| {
                assert_eq!(pipeline, "sum");
                assert_eq!(params, &params! { "b" => -1 });
                assert_eq!(error.status(), ResultStatus::ValidationError);
                PipelineResult::opaque(Value::atom("handled"))
            });

        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(echo)
            .fallback(fallback, FallbackConfig::take_over())
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run(params! { "b" => -1 }),
            PipelineResult::opaque(Value::atom("handled"))
        );
    }

    #[test]
    fn test_fallback_side_effect_keeps_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let pipeline = PipelineBuilder::new("fails")
            .process(|_, _| Ok(Reply::error("boom")))
            .fallback(
                move |_: &str, _: &ParamsMap, _: &PipelineResult| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    PipelineResult::opaque("ignored")
                },
                FallbackConfig::side_effect(),
            )
            .build()
            .unwrap();

        assert_eq!(pipeline.run(ParamsMap::new()), PipelineResult::process("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_sees_input_before_alias_resolution() {
        let mut fallback = MockFallback::new();
        fallback
            .expect_handle()
            .times(1)
            .returning(|_, params, error| {
                assert_eq!(params, &params! { "amt" => 5 });
                error.clone()
            });

        let pipeline = PipelineBuilder::new("charge")
            .contract(
                Contract::builder()
                    .field(FieldBuilder::new("amount").type_of("integer").from("amt"))
                    .build()
                    .unwrap(),
            )
            .process(|_, _| Ok(Reply::error("boom")))
            .fallback(fallback, FallbackConfig::side_effect())
            .build()
            .unwrap();

        assert_eq!(pipeline.run(params! { "amt" => 5 }), PipelineResult::process("boom"));
    }

    #[test]
    fn test_callback_runs_on_success_only() {
        let mut callback = MockCallback::new();
        callback
            .expect_on_success()
            .times(1)
            .returning(|pipeline, _, result, options| {
                assert_eq!(pipeline, "sum");
                assert!(result.is_ok());
                assert_eq!(options, &params! { "channel" => "audit" });
            });

        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(echo)
            .callback(callback, CallbackConfig::new().with_options(params! { "channel" => "audit" }))
            .build()
            .unwrap();

        assert!(pipeline.run(params! { "b" => 1 }).is_ok());
        assert!(pipeline.run(params! { "b" => 0 }).is_error());
    }

    #[test]
    fn test_strict_mode_raises_errors() {
        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(|_, params| {
                if params.get(&FieldName::str("b")) == Some(&Value::Int(13)) {
                    Ok(Reply::error("unlucky"))
                } else {
                    Ok(params.into())
                }
            })
            .build()
            .unwrap();

        assert!(matches!(
            pipeline.run_strict(ParamsMap::new()),
            Err(StrictError::Validation(_))
        ));
        assert!(matches!(
            pipeline.run_strict(params! { "b" => 13 }),
            Err(StrictError::Process(Value::Str(ref s))) if s == "unlucky"
        ));
        assert!(pipeline.run_strict(params! { "b" => 1 }).unwrap().is_ok());
    }

    #[test]
    fn test_strict_mode_returns_auth_errors_as_data() {
        let pipeline = PipelineBuilder::new("open")
            .process(|ctx, _| {
                ctx.authorize(&Value::Null)?;
                Ok(Reply::ok(1))
            })
            .build()
            .unwrap();

        assert_eq!(
            pipeline.run_strict(ParamsMap::new()).unwrap(),
            PipelineResult::auth(Value::atom("undefined_policy"))
        );
    }

    #[test]
    fn test_cross_field_custom_check() {
        let contract = Contract::builder()
            .field(FieldBuilder::new("min").type_of("integer"))
            .field(FieldBuilder::new("max").type_of("integer").custom(CustomCheck::with_params(
                |params, max| {
                    let min = params.get(&FieldName::str("min")).and_then(Value::as_number);
                    match (min, max.as_number()) {
                        (Some(min), Some(max)) => max.as_f64() >= min.as_f64(),
                        _ => true,
                    }
                },
            )))
            .build()
            .unwrap();
        let pipeline = PipelineBuilder::new("range")
            .contract(contract)
            .process(echo)
            .build()
            .unwrap();

        let result = pipeline.run(params! { "min" => 5, "max" => 1 });
        assert_eq!(
            result.field_errors().and_then(|e| e.messages(&FieldName::str("max"))),
            Some(&["isn't valid".to_string()][..])
        );
    }

    #[test]
    fn test_accepts_json_and_keyword_input() {
        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(echo)
            .build()
            .unwrap();

        assert!(pipeline.run(serde_json::json!({"b": 3})).is_ok());
        assert!(pipeline.run(vec![("b", 3)]).is_ok());
        assert_eq!(
            pipeline.run(Value::from("not a map")).status(),
            ResultStatus::ValidationError
        );
    }

    #[test]
    fn test_lifecycle_events() {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new("sum")
            .contract(scenario_contract())
            .process(echo)
            .fallback(
                |_: &str, _: &ParamsMap, _: &PipelineResult| PipelineResult::opaque(0),
                FallbackConfig::side_effect(),
            )
            .event_sink(sink.clone())
            .build()
            .unwrap();

        pipeline.run(params! { "b" => 1 });
        pipeline.run(params! { "b" => -1 });

        assert_eq!(
            sink.event_types(),
            vec![
                types::PIPELINE_STARTED,
                types::PIPELINE_COMPLETED,
                types::PIPELINE_STARTED,
                types::PIPELINE_FALLBACK,
                types::PIPELINE_FAILED,
            ]
        );
        let completed = sink.events()[1].1.clone().unwrap();
        assert_eq!(completed["pipeline"], "sum");
        assert_eq!(completed["status"], "ok");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_invocations_share_pipeline() {
        let pipeline: Arc<Pipeline> = Arc::new(
            PipelineBuilder::new("double")
                .contract(
                    Contract::builder()
                        .field(FieldBuilder::new("n").required().type_of("integer"))
                        .build()
                        .unwrap(),
                )
                .process(|_, params| match params.get(&FieldName::str("n")) {
                    Some(Value::Int(n)) => Ok(Reply::ok(n * 2)),
                    _ => Ok(Reply::error("missing")),
                })
                .build()
                .unwrap(),
        );

        let handles: Vec<_> = (0..32_i64)
            .map(|n| {
                let pipeline = Arc::clone(&pipeline);
                tokio::task::spawn_blocking(move || pipeline.run(params! { "n" => n }))
            })
            .collect();

        for (n, handle) in (0..32_i64).zip(handles) {
            assert_eq!(handle.await.unwrap(), PipelineResult::ok(n * 2));
        }
    }
}
