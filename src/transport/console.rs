//! Line-oriented console chat for a single local user

use crate::runtime::{AgentRuntime, OutgoingMessage};
use crate::state_machine::Form;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const USER_ID: &str = "console";

/// Run the chat until `input` is exhausted
///
/// Documents are written into `document_dir` and announced by path.
pub async fn run<R, W>(
    runtime: &AgentRuntime,
    document_dir: &Path,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output
        .write_all(b"Type /start to begin, Ctrl-D to quit.\n")
        .await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        for message in runtime.handle_message(USER_ID, line).await {
            let text = render(&message, document_dir).await?;
            output.write_all(text.as_bytes()).await?;
        }
        output.flush().await?;
    }

    Ok(())
}

async fn render(message: &OutgoingMessage, document_dir: &Path) -> std::io::Result<String> {
    let mut text = match message {
        OutgoingMessage::Text { text, .. } => format!("{text}\n"),
        OutgoingMessage::Document {
            filename,
            caption,
            content,
            ..
        } => {
            let path = document_dir.join(filename);
            tokio::fs::write(&path, content).await?;
            tracing::info!(path = %path.display(), "Wrote document");
            format!("{caption}\n[document saved to {}]\n", path.display())
        }
    };

    if message.show_menu() {
        let options: Vec<String> = Form::ALL
            .iter()
            .map(|form| format!("[{}]", form.label()))
            .collect();
        text.push_str(&options.join(" "));
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpenseRecord;
    use crate::runtime::testing::MockExpenseApi;
    use crate::state_machine::SessionContext;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_report_written_to_document_dir() {
        let dir = tempfile::tempdir().unwrap();
        let api = MockExpenseApi::new();
        api.queue_listed(Ok(vec![ExpenseRecord {
            id: 1,
            title: "Coffee".into(),
            date: "05.03.2024".into(),
            amount_local: 80.0,
            amount_foreign: 3.28,
        }]));
        let runtime = AgentRuntime::new(Arc::new(api), SessionContext::new("UAH"));

        let input: &[u8] = b"Expense report\n01.03.2024\n\n31.03.2024\n";
        let mut output = Vec::new();
        run(&runtime, dir.path(), input, &mut output).await.unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Enter the period start date (dd.mm.YYYY):"));
        assert!(transcript.contains("Total expenses: 80.00 UAH"));
        assert!(transcript.contains("[Add expense] [Expense report] [Delete expense] [Edit expense]"));

        let csv = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert!(csv.contains("Coffee"));
        assert!(csv.ends_with(",Total,,80.00,\n"));
    }
}
