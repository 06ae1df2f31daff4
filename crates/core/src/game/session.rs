//! Game session: a turn controller wired to a move service
//!
//! The session is the only writer of the game. All operations take
//! `&mut self`, so commits never interleave and at most one move request is
//! in flight. If the service fails, the turn stays with the external side
//! until [`GameSession::check_health`] succeeds and the move is requested
//! again. There is no automatic retry.

use tracing::{error, warn};

use super::controller::{TurnController, TurnEvent};
use crate::board::{Side, Square};
use crate::error::Error;
use crate::service::{MoveRequest, MoveResponse, MoveService};

pub struct GameSession<S> {
    controller: TurnController,
    service: S,
}

impl<S: MoveService> GameSession<S> {
    pub fn new(service: S, human_side: Side) -> Self {
        Self {
            controller: TurnController::new(human_side),
            service,
        }
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Checks the service and enables or disables automatic requests
    pub async fn check_health(&mut self) -> bool {
        match self.service.health().await {
            Ok(status) if status.is_healthy() => {
                self.controller.set_service_available(true);
                true
            }
            Ok(status) => {
                warn!(status = %status.status, "move service is not healthy");
                self.controller
                    .record_service_failure(&Error::Service(format!("unhealthy status: {}", status.status)));
                false
            }
            Err(e) => {
                error!(%e, "move service unreachable");
                self.controller.record_service_failure(&e);
                false
            }
        }
    }

    /// Resets the board, re-checks the service and, if the service plays
    /// first, plays its opening move
    pub async fn new_game(&mut self) -> Vec<TurnEvent> {
        self.controller.reset();
        self.check_health().await;
        self.request_pending().await.into_iter().collect()
    }

    /// Human square activation, followed by the service's reply when the
    /// activation handed it the turn
    pub async fn activate(&mut self, square: Square) -> Vec<TurnEvent> {
        let outcome = self.controller.activate_square(square);
        let mut events = vec![outcome.event];
        if let Some(request) = outcome.request {
            events.extend(self.fulfil(request).await);
        }
        events
    }

    /// Requests the external side's move if one is due and none is in flight
    pub async fn request_pending(&mut self) -> Option<TurnEvent> {
        let request = self.controller.request_external_move()?;
        self.fulfil(request).await
    }

    async fn fulfil(&mut self, request: MoveRequest) -> Option<TurnEvent> {
        let reply = self
            .service
            .request_move(&request)
            .await
            .and_then(MoveResponse::into_move);

        match reply {
            Ok(text) => Some(self.controller.apply_external_move(&text).event),
            Err(e) => {
                error!(%e, "external move request failed");
                self.controller.record_service_failure(&e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardState, MoveCommand};
    use crate::error::Result;
    use crate::game::MoveOrigin;
    use crate::service::HealthStatus;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedService {
        status: Option<&'static str>,
        replies: Mutex<VecDeque<Result<MoveResponse>>>,
        requests: Mutex<Vec<MoveRequest>>,
    }

    impl ScriptedService {
        fn new(status: Option<&'static str>, replies: Vec<Result<MoveResponse>>) -> Self {
            Self {
                status,
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn healthy(replies: Vec<Result<MoveResponse>>) -> Self {
            Self::new(Some("healthy"), replies)
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl MoveService for ScriptedService {
        async fn health(&self) -> Result<HealthStatus> {
            match self.status {
                Some(status) => Ok(HealthStatus {
                    status: status.to_string(),
                }),
                None => Err(Error::Service("connection refused".into())),
            }
        }

        async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Service("script exhausted".into())))
        }
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn proposed(mv: &str) -> Result<MoveResponse> {
        Ok(MoveResponse::proposed(mv.to_string()))
    }

    #[tokio::test]
    async fn test_human_move_is_answered() {
        let mut session = GameSession::new(ScriptedService::healthy(vec![proposed("e5")]), Side::White);
        assert!(session.new_game().await.is_empty());

        session.activate(sq("e2")).await;
        let events = session.activate(sq("e4")).await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], TurnEvent::Moved { origin: MoveOrigin::Interpreted, .. }));
        assert_eq!(session.controller().side_to_move(), Side::White);
        assert!(session.controller().board().piece_at(sq("e5")).is_some());

        let mut after_e4 = BoardState::new();
        let pawn = after_e4.piece_at(sq("e2")).unwrap().id();
        after_e4.commit(&MoveCommand::new(pawn, sq("e4"))).unwrap();

        let requests = session.service().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].side_to_move, Side::Black);
        assert_eq!(requests[0], MoveRequest::from_board(&after_e4));
    }

    #[tokio::test]
    async fn test_unresolvable_reply_falls_back() {
        let mut session = GameSession::new(ScriptedService::healthy(vec![proposed("O-O")]), Side::White);
        session.new_game().await;

        session.activate(sq("g1")).await;
        let events = session.activate(sq("f3")).await;

        match &events[1] {
            TurnEvent::Moved { record, origin } => {
                assert_eq!(*origin, MoveOrigin::Fallback);
                assert_eq!(record.side, Side::Black);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(session.controller().side_to_move(), Side::White);
    }

    #[tokio::test]
    async fn test_transport_failure_stalls_until_recheck() {
        let service = ScriptedService::healthy(vec![
            Err(Error::Service("502 Bad Gateway".into())),
            proposed("d5"),
        ]);
        let mut session = GameSession::new(service, Side::White);
        session.new_game().await;

        session.activate(sq("e2")).await;
        let events = session.activate(sq("e4")).await;
        assert_eq!(events.len(), 1);
        assert_eq!(session.controller().side_to_move(), Side::Black);
        assert!(session.controller().last_error().is_some());

        assert_eq!(session.activate(sq("e4")).await, vec![TurnEvent::Ignored]);
        assert!(session.request_pending().await.is_none());
        assert_eq!(session.service().request_count(), 1);

        assert!(session.check_health().await);
        let reply = session.request_pending().await;
        assert!(matches!(reply, Some(TurnEvent::Moved { .. })));
        assert_eq!(session.controller().side_to_move(), Side::White);
        assert_eq!(session.service().request_count(), 2);
    }

    #[tokio::test]
    async fn test_unhealthy_service_disables_requests() {
        let mut session = GameSession::new(ScriptedService::new(Some("starting"), vec![]), Side::White);
        session.new_game().await;
        assert!(!session.controller().auto_requests_enabled());
        assert!(session.controller().last_error().unwrap().contains("starting"));

        session.activate(sq("e2")).await;
        let events = session.activate(sq("e4")).await;
        assert_eq!(events.len(), 1);
        assert_eq!(session.service().request_count(), 0);
        assert_eq!(session.controller().side_to_move(), Side::Black);
    }

    #[tokio::test]
    async fn test_unreachable_service_at_start() {
        let mut session = GameSession::new(ScriptedService::new(None, vec![]), Side::White);
        session.new_game().await;
        assert!(!session.controller().auto_requests_enabled());
        assert!(session.controller().last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_service_moves_first_for_black_human() {
        let mut session = GameSession::new(ScriptedService::healthy(vec![proposed("Nf3")]), Side::Black);
        let events = session.new_game().await;

        assert_eq!(events.len(), 1);
        assert_eq!(session.controller().side_to_move(), Side::Black);
        assert!(session.controller().board().piece_at(sq("f3")).is_some());
    }

    #[tokio::test]
    async fn test_declined_move_keeps_turn() {
        let service = ScriptedService::healthy(vec![Ok(MoveResponse::failed("no_legal_moves"))]);
        let mut session = GameSession::new(service, Side::White);
        session.new_game().await;

        session.activate(sq("e2")).await;
        session.activate(sq("e4")).await;
        assert_eq!(session.controller().side_to_move(), Side::Black);
        assert!(session.controller().auto_requests_enabled());
        assert!(session.controller().last_error().unwrap().contains("no_legal_moves"));
    }
}
