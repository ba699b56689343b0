//! The stdio transport driven through in-memory streams.

mod common;

use serde_json::Value;
use sqlx::PgPool;
use tokio::io::BufReader;
use vidcat_server::mcp::stdio::serve;

async fn run_lines(pool: PgPool, input: &str) -> Vec<Value> {
    let state = common::test_state(pool);
    let mut output = Vec::new();
    serve(&state, BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_response_line_per_request(pool: PgPool) {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n",
    );

    let responses = run_lines(pool, input).await;
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"], serde_json::json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tool_call_over_stdio(pool: PgPool) {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create_video_metadata","arguments":{"title":"Cup","game_type":"rugby","teams":["Wales","France"]}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list_unique_teams"}}"#,
        "\n",
        "garbage\n",
    );

    let responses = run_lines(pool, input).await;
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["isError"], false);
    assert_eq!(responses[1]["result"]["content"][0]["text"], "France, Wales");
    assert_eq!(responses[2]["error"]["code"], -32700);
}
