//! Property-based tests for the conversation store
//!
//! These tests verify the store's structural invariants:
//! - Derived titles never exceed the cap, and carry the marker iff cut
//! - Conversations only ever grow (append-only)
//! - Non-blank text always appends exactly one message

use super::title::{derive_title, TITLE_MAX_CHARS};
use super::{Role, SessionStore};
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    // Mixed ASCII and CJK, to exercise the character-counting cut.
    "[a-zA-Z0-9 你好世界诗歌排序算法]{1,60}"
}

proptest! {
    #[test]
    fn title_is_bounded_and_marked_iff_truncated(text in arb_text()) {
        let title = derive_title(&text);
        let text_chars = text.chars().count();

        if text_chars > TITLE_MAX_CHARS {
            prop_assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
            prop_assert!(title.ends_with("..."));
            let prefix: String = text.chars().take(TITLE_MAX_CHARS).collect();
            prop_assert!(title.starts_with(&prefix));
        } else {
            prop_assert_eq!(title, text);
        }
    }

    #[test]
    fn conversations_only_grow(texts in prop::collection::vec(arb_text(), 1..10)) {
        let store = SessionStore::in_memory();
        let id = store.active_conversation_id();
        let mut last_len = store.conversation(&id).unwrap().messages.len();
        prop_assert!(last_len >= 1);

        for (i, text) in texts.iter().enumerate() {
            if i % 2 == 0 {
                store.append_user_message(&id, text).unwrap();
            } else {
                store.append_assistant_message(&id, text).unwrap();
            }
            let len = store.conversation(&id).unwrap().messages.len();
            prop_assert_eq!(len, last_len + 1);
            last_len = len;
        }
    }

    #[test]
    fn non_blank_text_always_appends_a_user_message(text in arb_text()) {
        prop_assume!(!text.trim().is_empty());

        let store = SessionStore::in_memory();
        let id = store.active_conversation_id();

        let message = store.append_user_message(&id, &text).unwrap();
        prop_assert_eq!(message.role, Role::User);

        let conv = store.conversation(&id).unwrap();
        prop_assert_eq!(conv.messages.last().unwrap().content.clone(), text);
        prop_assert_eq!(conv.updated_at, message.timestamp);
    }
}
