//! End-to-end turn tests against a scripted provider.

mod common;

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::*;
use helm::agent::Agent;
use helm::agent_loop::{consume, final_response_text, RunConfig, TurnEvent, TurnOutcome};
use helm::error::HelmError;
use helm::session::{EventContent, SessionStore};
use helm::tools::builtin::weather_tool;
use helm::tools::{AgentTool, AgentToolParameters, ToolOutcome};
use helm::types::Role;

const NEW_YORK_REPORT: &str = "The weather in New York is sunny with a temperature of 25°C.";

#[tokio::test]
async fn known_city_answers_with_report() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"city": "New York"}));
    provider.queue_response(NEW_YORK_REPORT);
    let (runner, _store) = weather_runner(provider.clone());

    let events = collect_turn(&runner, "What is the weather like in New York?").await;

    assert_eq!(
        events,
        vec![
            TurnEvent::ToolCall {
                call_id: "c1".into(),
                tool_name: "get_weather".into(),
                arguments: json!({"city": "New York"}),
            },
            TurnEvent::ToolResult {
                call_id: "c1".into(),
                tool_name: "get_weather".into(),
                result: ToolOutcome::success(NEW_YORK_REPORT),
            },
            TurnEvent::final_response(NEW_YORK_REPORT),
        ]
    );

    // The second decision saw the tool result.
    let second = &provider.requests()[1];
    let result = second
        .messages
        .iter()
        .flat_map(|m| m.tool_results())
        .next()
        .cloned()
        .unwrap();
    assert_eq!(result.result["report"], NEW_YORK_REPORT);
    assert!(!result.is_error);
}

#[tokio::test]
async fn unknown_city_is_relayed_not_escalated() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"city": "Paris"}));
    provider.queue_response("I'm sorry, I don't have weather information for Paris.");
    let (runner, _store) = weather_runner(provider.clone());

    let events = collect_turn(&runner, "How about Paris?").await;

    assert_single_terminal_last(&events);
    assert!(matches!(
        &events[1],
        TurnEvent::ToolResult { result: ToolOutcome::Error { message }, .. }
            if message == "Sorry, I don't have weather information for 'Paris'."
    ));
    assert_eq!(
        events.last(),
        Some(&TurnEvent::final_response(
            "I'm sorry, I don't have weather information for Paris."
        ))
    );

    let fed_back = provider.requests()[1]
        .messages
        .iter()
        .flat_map(|m| m.tool_results())
        .next()
        .cloned()
        .unwrap();
    assert!(fed_back.is_error);
    assert_eq!(fed_back.result["status"], "error");
}

#[tokio::test]
async fn quota_fault_escalates_with_code() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_error(HelmError::QuotaExceeded("daily request limit reached".into()));
    let (runner, _store) = weather_runner(provider);

    let outcome = consume(runner.run(USER_ID, SESSION_ID, "Tell me the weather in Tokyo")).await;

    assert_eq!(
        outcome,
        TurnOutcome::Escalated {
            error_code: "QUOTA".into(),
            error_message: "Quota exceeded: daily request limit reached".into(),
        }
    );
    let text = outcome.text();
    assert!(text.contains("QUOTA"));
    assert!(text.contains("daily request limit reached"));
}

#[tokio::test]
async fn blank_model_reply_escalates_instead_of_empty_answer() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_response("   ");
    let (runner, store) = weather_runner(provider);

    let events = collect_turn(&runner, "What is the weather like in London?").await;

    assert_single_terminal_last(&events);
    assert_eq!(
        events,
        vec![TurnEvent::escalation(
            "EMPTY_RESPONSE",
            "Empty response from mock: no text and no tool calls"
        )]
    );

    let session = store
        .get(&runner.session_key(USER_ID, SESSION_ID))
        .await
        .unwrap()
        .unwrap();
    assert!(session
        .events
        .iter()
        .all(|e| !matches!(e.turn_event(), Some(TurnEvent::FinalResponse { .. }))));
}

#[tokio::test]
async fn second_turn_sees_first_turn_tool_result() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"city": "London"}));
    provider.queue_response("It's cloudy in London.");
    provider.queue_response("Yes, it was London.");
    let (runner, _store) = weather_runner(provider.clone());

    collect_turn(&runner, "Weather in London?").await;
    let answer = final_response_text(runner.run(USER_ID, SESSION_ID, "Which city did I ask about?")).await;
    assert_eq!(answer, "Yes, it was London.");

    let third = &provider.requests()[2];
    let roles: Vec<Role> = third.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::Tool,
            Role::Assistant,
            Role::User,
        ]
    );
    let result = third.messages[3].tool_results()[0].clone();
    assert_eq!(result.tool_call_id, "c1");
    assert_eq!(
        result.result["report"],
        "It's cloudy in London with a temperature of 15°C."
    );
}

#[tokio::test]
async fn every_request_carries_instruction_and_tools() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_response("Hello!");
    let (runner, _store) = weather_runner(provider.clone());

    collect_turn(&runner, "hi").await;

    let request = &provider.requests()[0];
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].text().contains("helpful weather assistant"));
    let tools = request.tools.as_ref().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "get_weather");
    assert_eq!(tools[0].parameters["required"], json!(["city"]));
}

#[tokio::test]
async fn unknown_tool_is_fed_back_and_turn_terminates() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_forecast", json!({"city": "Tokyo"}));
    provider.queue_response("I can only report current weather.");
    let (runner, _store) = weather_runner(provider);

    let events = collect_turn(&runner, "Forecast for Tokyo?").await;

    assert_single_terminal_last(&events);
    match &events[1] {
        TurnEvent::ToolResult {
            tool_name,
            result: ToolOutcome::Error { message },
            ..
        } => {
            assert_eq!(tool_name, "get_forecast");
            assert!(message.contains("Unknown tool"));
        }
        other => panic!("expected error tool result, got {other:?}"),
    }
    assert!(matches!(events.last(), Some(TurnEvent::FinalResponse { .. })));
}

#[tokio::test]
async fn invalid_arguments_are_fed_back() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"town": "Tokyo"}));
    provider.queue_response("Which city?");
    let (runner, _store) = weather_runner(provider);

    let events = collect_turn(&runner, "weather?").await;

    assert!(matches!(
        &events[1],
        TurnEvent::ToolResult { result: ToolOutcome::Error { message }, .. }
            if message.contains("missing required parameter 'city'")
    ));
    assert_single_terminal_last(&events);
}

#[tokio::test]
async fn panicking_tool_becomes_error_outcome() {
    let agent = Agent::new("fragile", mock_model())
        .with_tool(AgentTool::from_fn(
            "explode",
            "Always panics",
            AgentToolParameters::empty(),
            |_| panic!("sensor offline"),
        ))
        .unwrap();
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "explode", json!({}));
    provider.queue_response("The tool failed.");
    let (runner, _store) = runner_for(Arc::new(agent), provider, RunConfig::default());

    let events = collect_turn(&runner, "go").await;

    assert!(matches!(
        &events[1],
        TurnEvent::ToolResult { result: ToolOutcome::Error { message }, .. }
            if message.contains("sensor offline")
    ));
    assert_eq!(events.last(), Some(&TurnEvent::final_response("The tool failed.")));
}

#[tokio::test]
async fn parallel_calls_are_dispatched_in_order() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_calls(vec![
        ("a", "get_weather", json!({"city": "Tokyo"})),
        ("b", "get_weather", json!({"city": "Paris"})),
    ]);
    provider.queue_response("Tokyo has rain; no data for Paris.");
    let (runner, _store) = weather_runner(provider);

    let events = collect_turn(&runner, "Tokyo and Paris?").await;

    let kinds: Vec<&str> = events.iter().map(TurnEvent::kind).collect();
    assert_eq!(
        kinds,
        vec!["tool_call", "tool_result", "tool_call", "tool_result", "final_response"]
    );
    assert!(matches!(&events[1], TurnEvent::ToolResult { call_id, result, .. } if call_id == "a" && result.is_success()));
    assert!(matches!(&events[3], TurnEvent::ToolResult { call_id, result, .. } if call_id == "b" && !result.is_success()));
}

#[tokio::test]
async fn loop_limit_escalates() {
    let provider = Arc::new(MockProvider::new("scripted"));
    for i in 0..3 {
        provider.queue_tool_call(&format!("c{i}"), "get_weather", json!({"city": "London"}));
    }
    let (runner, _store) = runner_for(
        weather_test_agent(),
        provider.clone(),
        RunConfig { max_round_trips: 2 },
    );

    let events = collect_turn(&runner, "London, again and again").await;

    assert_single_terminal_last(&events);
    assert_eq!(events.len(), 5);
    match events.last() {
        Some(TurnEvent::Escalation {
            error_code,
            error_message,
        }) => {
            assert_eq!(error_code, "LOOP_LIMIT_EXCEEDED");
            assert!(error_message.contains('2'));
        }
        other => panic!("expected escalation, got {other:?}"),
    }
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn zero_round_trips_still_allows_direct_answers() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_response("No tools needed.");
    let (runner, _store) = runner_for(
        weather_test_agent(),
        provider,
        RunConfig { max_round_trips: 0 },
    );

    let answer = final_response_text(runner.run(USER_ID, SESSION_ID, "hello")).await;
    assert_eq!(answer, "No tools needed.");
}

#[tokio::test]
async fn every_yielded_event_is_already_in_the_session() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"city": "Tokyo"}));
    provider.queue_response("Rainy.");
    let (runner, store) = weather_runner(provider);
    let key = runner.session_key(USER_ID, SESSION_ID);

    let mut stream = runner.run(USER_ID, SESSION_ID, "Tokyo?");
    while let Some(event) = stream.next().await {
        let session = store.get(&key).await.unwrap().unwrap();
        let last = session.events.last().and_then(|e| e.turn_event()).cloned();
        assert_eq!(last, Some(event));
    }

    let session = store.get(&key).await.unwrap().unwrap();
    assert_eq!(session.events.len(), 4);
    assert!(matches!(&session.events[0].content, EventContent::UserMessage(text) if text == "Tokyo?"));
    let invocation = session.events[0].invocation_id;
    assert_eq!(session.invocation_events(invocation).count(), 4);
    assert_eq!(session.events[1].author, "weather_agent_v1");
}

#[tokio::test]
async fn escalations_are_recorded_but_not_replayed() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_error(HelmError::Authentication("bad key".into()));
    provider.queue_response("Back online.");
    let (runner, store) = weather_runner(provider.clone());

    let first = collect_turn(&runner, "first").await;
    assert_eq!(
        first,
        vec![TurnEvent::escalation("AUTHENTICATION", "Authentication error: bad key")]
    );
    collect_turn(&runner, "second").await;

    let session = store
        .get(&runner.session_key(USER_ID, SESSION_ID))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.events.len(), 4);

    let roles: Vec<Role> = provider.requests()[1].messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::User]);
}

#[tokio::test]
async fn dropping_the_stream_keeps_partial_history() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_tool_call("c1", "get_weather", json!({"city": "Tokyo"}));
    provider.queue_response("never reached");
    let (runner, store) = weather_runner(provider.clone());

    let mut stream = runner.run(USER_ID, SESSION_ID, "Tokyo?");
    let first = stream.next().await.unwrap();
    assert_eq!(first.kind(), "tool_call");
    drop(stream);

    let session = store
        .get(&runner.session_key(USER_ID, SESSION_ID))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.events.len(), 2);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn sessions_are_independent() {
    let provider = Arc::new(MockProvider::new("scripted"));
    provider.queue_response("one");
    provider.queue_response("two");
    let (runner, store) = weather_runner(provider.clone());

    final_response_text(runner.run(USER_ID, "s-a", "a")).await;
    final_response_text(runner.run(USER_ID, "s-b", "b")).await;

    let keys = store.list_sessions(APP_NAME, USER_ID).await.unwrap();
    assert_eq!(keys.len(), 2);
    // The second session's request holds only its own input.
    let users: Vec<String> = provider.requests()[1]
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text())
        .collect();
    assert_eq!(users, vec!["b".to_string()]);
}

#[tokio::test]
async fn agent_with_extra_tools_rejects_duplicates() {
    let agent = Agent::new("twice", mock_model()).with_tool(weather_tool()).unwrap();
    assert!(matches!(
        agent.with_tool(weather_tool()),
        Err(HelmError::DuplicateTool(_))
    ));
}
