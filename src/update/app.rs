//! App message handlers (document load, unmount)

use crate::commands::Cmd;
use crate::messages::AppMsg;
use crate::model::{Document, EditorModel};

/// Handle session lifecycle messages
pub fn update_app(model: &mut EditorModel, msg: AppMsg) -> Option<Cmd> {
    match msg {
        AppMsg::LoadMarkdown(raw) => {
            model.ui.mounted = true;
            model.ui.clear_status();
            model.load_document(Document::from_markdown(&raw))
        }

        AppMsg::Unmount => {
            let cancelled = model.ghost.cancel(&mut model.tree);
            model.slash.close();
            model.tree.clear_selection();
            model.ui.mounted = false;
            tracing::debug!(cancelled = ?cancelled, "editor unmounted");

            Some(Cmd::batch(vec![
                cancelled
                    .map(|request_id| Cmd::CancelCompletion { request_id })
                    .unwrap_or_default(),
                Cmd::Redraw,
            ]))
        }
    }
}
