//! Property-based tests for the provider translation layer
//!
//! These tests verify that translating a history onto the wire preserves
//! key invariants:
//! - Every turn survives translation, in order, with its content intact
//! - Roles always land in the wire vocabulary, and round-trip losslessly
//! - A well-formed response always normalizes to its first choice

use super::openai::{self, ChatChoice, ChatChoiceMessage, ChatCompletionResponse};
use super::types::{ChatTurn, WireRole};
use crate::store::Role;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Ai)]
}

fn arb_turn() -> impl Strategy<Value = ChatTurn> {
    (arb_role(), "[a-zA-Z0-9 _.!?,]{0,100}").prop_map(|(role, content)| ChatTurn::new(role, content))
}

fn arb_history() -> impl Strategy<Value = Vec<ChatTurn>> {
    prop::collection::vec(arb_turn(), 1..20)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn translation_preserves_length_order_and_content(history in arb_history()) {
        let request = openai::translate_request(&history);

        prop_assert_eq!(request.messages.len(), history.len());
        for (turn, wire) in history.iter().zip(&request.messages) {
            prop_assert_eq!(&wire.content, &turn.content);
        }
    }

    #[test]
    fn translation_maps_roles_into_wire_vocabulary(history in arb_history()) {
        let request = openai::translate_request(&history);

        for (turn, wire) in history.iter().zip(&request.messages) {
            let expected = match turn.role {
                Role::User => WireRole::User,
                Role::Ai => WireRole::Assistant,
            };
            prop_assert_eq!(wire.role, expected);
        }
    }

    #[test]
    fn role_round_trip_is_identity(role in arb_role()) {
        prop_assert_eq!(Role::from(WireRole::from(role)), role);
    }

    #[test]
    fn normalize_returns_first_choice_content(
        contents in prop::collection::vec("[a-zA-Z0-9 ]{1,50}", 1..5)
    ) {
        let first = contents[0].clone();
        let resp = ChatCompletionResponse {
            choices: contents
                .into_iter()
                .map(|content| ChatChoice {
                    message: ChatChoiceMessage { content: Some(content) },
                })
                .collect(),
        };

        let reply = openai::normalize_response(resp).unwrap();
        prop_assert_eq!(reply.content, first);
        prop_assert_eq!(reply.role, Role::Ai);
    }
}
