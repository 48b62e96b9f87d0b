mod support;

use curriculum_wizard::cli::{run_plan, PlanInput};
use curriculum_wizard::error::AppError;
use curriculum_wizard::gateway::prompts::ResponseFormat;
use curriculum_wizard::gateway::RequestKind;
use curriculum_wizard::models::CourseType;
use curriculum_wizard::parsers::fallback::assessment_template;
use curriculum_wizard::validation::{Field, MAX_GOALS};
use curriculum_wizard::wizard::{ApplyOutcome, StepStatus, Wizard, WizardError, WizardStep};
use speculate2::speculate;
use support::ScriptedBackend;

const SUBJECT: &str = "Intro to Programming";

fn configured(backend: ScriptedBackend) -> Wizard<ScriptedBackend> {
    let mut wizard = Wizard::new(backend);
    let state = wizard.state_mut();
    state.set_course_type(CourseType::Course);
    assert!(state.confirm_course_subject(SUBJECT).is_valid);
    assert!(state.confirm_target_audience("First-year undergraduates").is_valid);
    assert!(state.confirm_instruction_duration("One semester").is_valid);
    state.confirm_setup().expect("setup confirms");
    wizard
}

fn with_goals(backend: ScriptedBackend, goals: &[&str]) -> Wizard<ScriptedBackend> {
    let mut wizard = configured(backend);
    for goal in goals {
        assert!(wizard.state_mut().add_goal(goal).is_valid, "{} rejected", goal);
    }
    wizard
}

/// Refine (with whatever the script says), approve and save the goals.
async fn at_assessments(wizard: &mut Wizard<ScriptedBackend>) {
    wizard.refine_goals().await.expect("refinement runs");
    wizard.state_mut().approve_goals().expect("goals approve");
    wizard.state_mut().confirm_goals_saved().expect("goals save");
}

speculate! {
    describe "course setup" {
        it "refuses to leave setup without a course type" {
            let mut wizard = Wizard::new(ScriptedBackend::default());
            let state = wizard.state_mut();
            state.confirm_course_subject(SUBJECT);
            state.confirm_target_audience("First-year undergraduates");
            state.confirm_instruction_duration("One semester");

            assert!(matches!(
                state.confirm_setup(),
                Err(WizardError::Invalid { field: Field::CourseType, .. })
            ));
            assert_eq!(state.current_step(), WizardStep::Setup);
            assert!(state.field_error(Field::CourseType).is_some());
        }

        it "moves to goal entry once every field is confirmed" {
            let wizard = configured(ScriptedBackend::default());
            assert_eq!(wizard.state().current_step(), WizardStep::Goals);
            assert!(wizard.state().setup_confirmed());
        }
    }

    describe "goal entry" {
        it "accepts the example goal" {
            let wizard = with_goals(ScriptedBackend::default(), &["Students will learn to code"]);
            assert_eq!(wizard.state().goals().len(), 1);
            assert!(!wizard.state().goals()[0].is_refined);
        }

        it "enforces the goal length bounds" {
            let mut wizard = configured(ScriptedBackend::default());
            assert!(!wizard.state_mut().add_goal("  123456789  ").is_valid);
            assert!(wizard.state_mut().add_goal("1234567890").is_valid);

            assert!(!wizard.state_mut().add_goal(&"b".repeat(301)).is_valid);
            assert!(wizard.state_mut().add_goal(&"a".repeat(300)).is_valid);
            assert_eq!(wizard.state().goals().len(), 2);
        }

        it "rejects a sixth goal and keeps five" {
            let mut wizard = with_goals(ScriptedBackend::default(), &[
                "Write simple functions",
                "Use loops correctly",
                "Debug failing programs",
                "Read error messages",
                "Test their own code",
            ]);

            let result = wizard.state_mut().add_goal("Document a small project");

            assert!(!result.is_valid);
            assert_eq!(result.error.as_deref(), Some("A maximum of 5 goals is allowed"));
            assert_eq!(wizard.state().goals().len(), MAX_GOALS);
        }

        it "rejects case-insensitive duplicates and the bare subject" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);

            assert!(!wizard.state_mut().add_goal("WRITE SIMPLE FUNCTIONS").is_valid);
            assert!(!wizard.state_mut().add_goal("intro to programming").is_valid);
            assert_eq!(wizard.state().goals().len(), 1);
        }
    }

    describe "goal refinement" {
        it "uses the refined line verbatim" {
            let backend = ScriptedBackend::replying(&[
                "REFINED GOAL 1: Students will be able to write a working function in Python.",
            ]);
            let mut wizard = with_goals(backend, &["Students will learn to code"]);

            let outcome = tokio_test::block_on(wizard.refine_goals()).unwrap();

            assert_eq!(outcome, ApplyOutcome::Applied);
            let refined = wizard.state().refined_goals();
            assert_eq!(refined.len(), 1);
            assert_eq!(
                refined[0].description,
                "Students will be able to write a working function in Python."
            );
            assert!(refined[0].is_refined);
            assert_eq!(wizard.state().current_step(), WizardStep::RefineGoals);

            let requests = wizard.backend().requests();
            assert_eq!(requests[0].kind, RequestKind::RefineGoals);
            assert!(requests[0].prompt.contains("Students will learn to code"));
        }

        it "carries goals over when nothing matches" {
            let backend = ScriptedBackend::replying(&["I'd be happy to help!"]);
            let goals = ["Write simple functions", "Debug failing programs"];
            let mut wizard = with_goals(backend, &goals);

            tokio_test::block_on(wizard.refine_goals()).unwrap();

            let refined = wizard.state().refined_goals();
            assert_eq!(refined.len(), 2);
            for (original, refined) in wizard.state().goals().iter().zip(refined) {
                assert_eq!(original.id, refined.id);
                assert_eq!(original.description, refined.description);
                assert!(refined.is_refined);
            }
        }

        it "falls back and raises a banner when the backend fails" {
            let backend = ScriptedBackend::new(vec![Err(AppError::from_status(503, "down"))]);
            let mut wizard = with_goals(backend, &["Write simple functions"]);

            tokio_test::block_on(wizard.refine_goals()).unwrap();

            assert_eq!(wizard.state().refined_goals().len(), 1);
            assert_eq!(wizard.state().current_step(), WizardStep::RefineGoals);
            assert_eq!(wizard.state().errors().len(), 1);
            assert!(!wizard.state().is_refining());

            let id = wizard.state().errors()[0].id;
            assert!(wizard.state_mut().dismiss_error(id));
            assert!(wizard.state().errors().is_empty());
        }

        it "lets the instructor edit a refined goal" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            tokio_test::block_on(wizard.refine_goals()).unwrap();
            let id = wizard.state().refined_goals()[0].id;

            wizard.state_mut().update_refined_goal(id, "  Students will be able to write functions.  ").unwrap();

            assert_eq!(
                wizard.state().refined_goals()[0].description,
                "Students will be able to write functions."
            );
            assert!(matches!(
                wizard.state_mut().update_refined_goal(9999, "Anything at all"),
                Err(WizardError::NotFound { .. })
            ));
        }
    }

    describe "assessment generation" {
        it "yields exactly one assessment per approved goal for any reply" {
            let replies = [
                r#"{"assessments":[{"goal":1,"strategies":[{"title":"Quiz","description":"Short quiz."}]}]}"#,
                "ASSESSMENT FOR GOAL 2:\nA debugging lab with three seeded bugs.",
                "1. Nothing useful\n\n### random heading",
                "",
                "{{{{ not json",
            ];

            for reply in replies {
                let backend = ScriptedBackend::replying(&["", reply]);
                let mut wizard = with_goals(backend, &["Write simple functions", "Debug failing programs"]);
                tokio_test::block_on(async {
                    at_assessments(&mut wizard).await;
                    wizard.generate_assessments().await.unwrap();
                });

                let state = wizard.state();
                let goal_ids: Vec<u64> = state.approved_goals().iter().map(|g| g.id).collect();
                let assessed: Vec<u64> = state.refined_assessments().iter().map(|a| a.goal_id).collect();
                assert_eq!(assessed, goal_ids, "reply: {:?}", reply);
                assert_eq!(state.current_step(), WizardStep::ReviewAssessments);
            }
        }

        it "uses subject templates for a refusal" {
            let backend = ScriptedBackend::replying(&["", "I cannot help with that."]);
            let mut wizard = with_goals(backend, &["Write simple functions", "Debug failing programs"]);
            tokio_test::block_on(async {
                at_assessments(&mut wizard).await;
                wizard.generate_assessments().await.unwrap();
            });

            let state = wizard.state();
            assert_eq!(state.refined_assessments().len(), 2);
            for (assessment, goal) in state.refined_assessments().iter().zip(state.approved_goals()) {
                assert_eq!(assessment.goal_id, goal.id);
                assert_eq!(assessment.description, assessment_template(SUBJECT, goal));
            }
        }

        it "asks for the configured reply format" {
            let backend = ScriptedBackend::default();
            let mut wizard = with_goals(backend, &["Write simple functions"])
                .with_assessment_format(ResponseFormat::Text);
            tokio_test::block_on(async {
                at_assessments(&mut wizard).await;
                wizard.generate_assessments().await.unwrap();
            });

            let requests = wizard.backend().requests();
            assert_eq!(requests[1].kind, RequestKind::GenerateAssessments);
            assert!(requests[1].prompt.contains("ASSESSMENT FOR GOAL 1:"));
        }
    }

    describe "objective generation" {
        it "starts when assessments are saved" {
            let backend = ScriptedBackend::replying(&[
                "",
                "",
                "OBJECTIVES FOR GOAL 1:\n• Apply: Write a function with parameters.\n• Evaluate: Review a peer's function.",
            ]);
            let mut wizard = with_goals(backend, &["Write simple functions"]);
            tokio_test::block_on(async {
                at_assessments(&mut wizard).await;
                wizard.generate_assessments().await.unwrap();
                wizard.state_mut().approve_assessments().unwrap();
                wizard.confirm_assessments_saved().await.unwrap();
            });

            let state = wizard.state();
            assert_eq!(state.current_step(), WizardStep::ReviewObjectives);
            assert_eq!(state.learning_objectives().len(), 2);
            assert_eq!(
                state.learning_objectives()[0].assessment_alignment,
                state.approved_assessments()[0].description
            );
            let kinds: Vec<RequestKind> = wizard.backend().requests().iter().map(|r| r.kind).collect();
            assert_eq!(kinds, [RequestKind::RefineGoals, RequestKind::GenerateAssessments, RequestKind::GenerateObjectives]);
        }

        it "regenerates when the step is entered again" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            tokio_test::block_on(async {
                at_assessments(&mut wizard).await;
                wizard.generate_assessments().await.unwrap();
                wizard.state_mut().approve_assessments().unwrap();
                wizard.confirm_assessments_saved().await.unwrap();
                wizard.go_to_step(WizardStep::GenerateObjectives).await.unwrap();
            });

            assert_eq!(wizard.backend().requests().len(), 4);
            assert_eq!(wizard.state().current_step(), WizardStep::ReviewObjectives);
        }
    }

    describe "navigation" {
        it "gates review-assessments on generated assessments" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            tokio_test::block_on(at_assessments(&mut wizard));
            assert!(!wizard.state().can_navigate_to_step(WizardStep::ReviewAssessments));

            tokio_test::block_on(wizard.generate_assessments()).unwrap();
            assert!(wizard.state().can_navigate_to_step(WizardStep::ReviewAssessments));
        }

        it "marks earlier steps completed and the current one active" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            tokio_test::block_on(at_assessments(&mut wizard));

            let state = wizard.state();
            let current = state.current_step();
            for step in WizardStep::ALL {
                let expected = if step < current {
                    StepStatus::Completed
                } else if step == current {
                    StepStatus::Active
                } else {
                    StepStatus::Upcoming
                };
                assert_eq!(state.step_status(step), expected, "{}", step);
            }
        }

        it "refuses to skip ahead" {
            let mut wizard = configured(ScriptedBackend::default());
            let result = tokio_test::block_on(wizard.go_to_step(WizardStep::Complete));
            assert!(matches!(result, Err(WizardError::Blocked { .. })));
            assert_eq!(wizard.state().current_step(), WizardStep::Goals);
        }
    }

    describe "stale replies" {
        it "discards a reply superseded by a newer request" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            let state = wizard.state_mut();

            let first = state.begin_refine_goals().unwrap();
            let second = state.begin_refine_goals().unwrap();

            let late = state.apply_refined_goals(first.token, Ok("REFINED GOAL 1: Students will be able to write stale code.".into()));
            assert_eq!(late, ApplyOutcome::Stale);
            assert!(state.refined_goals().is_empty());
            assert!(state.is_refining());

            let fresh = state.apply_refined_goals(second.token, Ok("REFINED GOAL 1: Students will be able to write fresh code.".into()));
            assert_eq!(fresh, ApplyOutcome::Applied);
            assert_eq!(state.refined_goals()[0].description, "Students will be able to write fresh code.");
            assert!(!state.is_refining());
        }

        it "discards a reply that lands after a reset" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            let state = wizard.state_mut();
            let pending = state.begin_refine_goals().unwrap();

            state.reset_application();
            let outcome = state.apply_refined_goals(pending.token, Ok("REFINED GOAL 1: Too late.".into()));

            assert_eq!(outcome, ApplyOutcome::Stale);
            assert!(state.goals().is_empty());
            assert!(state.refined_goals().is_empty());
        }
    }

    describe "reset" {
        it "returns every getter to its initial value" {
            let mut wizard = with_goals(ScriptedBackend::default(), &["Write simple functions"]);
            tokio_test::block_on(async {
                at_assessments(&mut wizard).await;
                wizard.generate_assessments().await.unwrap();
            });

            wizard.state_mut().reset_application();

            let state = wizard.state();
            assert_eq!(state.current_step(), WizardStep::Setup);
            assert_eq!(state.course_type(), None);
            assert_eq!(state.course_subject(), "");
            assert_eq!(state.target_audience(), "");
            assert_eq!(state.instruction_duration(), "");
            assert!(!state.course_subject_confirmed());
            assert!(!state.setup_confirmed());
            assert!(state.goals().is_empty());
            assert!(state.refined_goals().is_empty());
            assert!(state.approved_goals().is_empty());
            assert!(state.refined_assessments().is_empty());
            assert!(state.approved_assessments().is_empty());
            assert!(state.learning_objectives().is_empty());
            assert!(state.approved_objectives().is_empty());
            assert!(state.errors().is_empty());
            assert!(!state.is_refining());
        }
    }

    describe "plan runner" {
        it "walks every step and assembles the framework" {
            let input = PlanInput {
                course_type: CourseType::Workshop,
                course_subject: "Intro to 3D Printing".to_string(),
                target_audience: "Makerspace members".to_string(),
                instruction_duration: "Two evenings".to_string(),
                goals: vec![
                    "Slice a model for printing".to_string(),
                    "Troubleshoot failed prints".to_string(),
                ],
            };
            let backend = ScriptedBackend::new(vec![
                Ok("REFINED GOAL 1: Students will be able to slice a model for 3D printing.".to_string()),
                Err(AppError::from_status(500, "upstream down")),
                Ok(String::new()),
            ]);

            let state = tokio_test::block_on(run_plan(&input, backend, ResponseFormat::Json)).unwrap();

            assert_eq!(state.current_step(), WizardStep::Complete);
            assert_eq!(state.errors().len(), 1);
            let framework = state.framework();
            assert!(framework.is_complete());
            assert_eq!(framework.entries.len(), 2);
            assert_eq!(framework.entries[1].objectives.len(), 2);

            let markdown = framework.render_markdown();
            assert!(markdown.starts_with("# Curriculum Framework: Intro to 3D Printing"));
            assert!(markdown.contains("Students will be able to slice a model for 3D printing."));
            assert!(markdown.contains("**Print Project**"));
        }

        it "stops on invalid setup input" {
            let input = PlanInput {
                course_type: CourseType::Course,
                course_subject: "AI".to_string(),
                target_audience: "Anyone curious".to_string(),
                instruction_duration: "A week".to_string(),
                goals: vec!["Explain what a model is".to_string()],
            };

            let err = tokio_test::block_on(run_plan(&input, ScriptedBackend::default(), ResponseFormat::Json)).unwrap_err();

            assert!(matches!(err, WizardError::Invalid { field: Field::CourseSubject, .. }));
        }
    }
}
