//! Aggregate roots for the game session context.

use snowball_core::aggregate::AggregateRoot;
use snowball_core::clock::Clock;
use snowball_core::error::DomainError;
use snowball_core::event::EventMetadata;
use snowball_core::rng::DeterministicRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::{Scenario, ScenarioCatalog};
use super::commands::{InputEvent, InputKind, Utterance};
use super::config::GameConfig;
use super::debounce::{Debouncer, PressGap};
use super::events::{
    ButtonRegistered, EndReason, FinalTally, GadgetEventObserved, GameEnded, GameEvent,
    GameEventKind, GameReset, GameStarted, HighScoreBeaten, HighScoreRaised, PlayerEliminated,
    ProfileEvent, ProfileEventKind, RoundAdvanced, SessionLaunched, SessionStopped,
};
use super::lights::{ColorState, LightHint};
use super::narration;
use super::outcome::{InputRejection, Outcome, RegistrationProblem};
use super::registry::{ButtonRegistry, GadgetId, PressResolution, Role};
use super::round::{GameMode, RoundState, Signal, Stage, Verdict, judge};
use super::scoring::{DualScores, ScoreSummary, solo_final_score};

/// Everything a turn reads but never changes.
pub struct TurnContext<'a> {
    /// Content the session was launched against.
    pub catalog: &'a ScenarioCatalog,
    /// Tuning for this invocation.
    pub config: &'a GameConfig,
    /// Stamps recorded events.
    pub clock: &'a dyn Clock,
    /// Copied onto every recorded event.
    pub correlation_id: Uuid,
}

/// The aggregate root for one play session.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (persisted event count).
    pub(crate) version: i64,
    pub(crate) player_id: Option<Uuid>,
    pub(crate) catalog_digest: Option<String>,
    pub(crate) stage: Stage,
    pub(crate) mode: GameMode,
    pub(crate) registry: ButtonRegistry,
    pub(crate) debouncer: Debouncer,
    pub(crate) round: RoundState,
    pub(crate) scores: DualScores,
    pub(crate) high_score: u32,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<GameEvent>,
}

impl GameSession {
    /// Creates an empty, unlaunched session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            player_id: None,
            catalog_digest: None,
            stage: Stage::Unlaunched,
            mode: GameMode::Undetermined,
            registry: ButtonRegistry::default(),
            debouncer: Debouncer::default(),
            round: RoundState::default(),
            scores: DualScores::default(),
            high_score: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// The player the session belongs to, once launched.
    #[must_use]
    pub fn player_id(&self) -> Option<Uuid> {
        self.player_id
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Solo, dual, or not chosen yet.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Registered controllers.
    #[must_use]
    pub fn registry(&self) -> &ButtonRegistry {
        &self.registry
    }

    /// Round counter and the scenario in play.
    #[must_use]
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Two-player scoreboard.
    #[must_use]
    pub fn scores(&self) -> &DualScores {
        &self.scores
    }

    /// Best solo score known to this session.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Score snapshot for the current mode. In solo play the streak counts
    /// completed rounds; once the game is over it is the final score.
    #[must_use]
    pub fn score_summary(&self) -> ScoreSummary {
        match self.mode {
            GameMode::Undetermined => ScoreSummary::Undetermined {
                high_score: self.high_score,
            },
            GameMode::Solo => {
                let streak = if matches!(self.stage, Stage::GameOver | Stage::Stopped) {
                    self.round.round
                } else {
                    solo_final_score(self.round.round)
                };
                ScoreSummary::Solo {
                    streak,
                    high_score: self.high_score,
                }
            }
            GameMode::Dual => ScoreSummary::dual(&self.scores),
        }
    }

    /// The high score set by uncommitted events, if one was beaten.
    #[must_use]
    pub fn new_high_score(&self) -> Option<u32> {
        self.uncommitted_events
            .iter()
            .filter_map(|event| match &event.kind {
                GameEventKind::HighScoreBeaten(payload) => Some(payload.score),
                _ => None,
            })
            .last()
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Records an event and folds it into the in-memory state straight away,
    /// so later decisions in the same turn see it.
    fn record(&mut self, kind: GameEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &GameEventKind) {
        match kind {
            GameEventKind::SessionLaunched(payload) => {
                self.player_id = Some(payload.player_id);
                self.high_score = payload.high_score;
                self.catalog_digest = Some(payload.catalog_digest.clone());
                self.stage = Stage::AwaitingRegistration;
            }
            GameEventKind::GadgetEventObserved(payload) => self.debouncer.observe(payload.at),
            GameEventKind::ButtonRegistered(payload) => {
                self.registry.assign(payload.role, payload.gadget_id.clone());
                if payload.role == Role::Red && self.stage == Stage::AwaitingRegistration {
                    self.stage = Stage::AwaitingModeChoice;
                }
            }
            GameEventKind::GameStarted(payload) => {
                self.mode = payload.mode;
                self.stage = Stage::InRound;
                self.round = RoundState::starting_with(Some(payload.opening));
                self.scores = DualScores::default();
            }
            GameEventKind::RoundAdvanced(payload) => {
                if let Some(role) = payload.credited {
                    self.scores.credit(role);
                }
                self.round.advance(payload.next);
            }
            GameEventKind::PlayerEliminated(payload) => {
                self.scores.eliminate(payload.role);
                if let Some(next) = payload.next {
                    self.round.deal(next);
                }
            }
            GameEventKind::GameEnded(payload) => {
                self.stage = Stage::GameOver;
                if let FinalTally::Solo { final_score } = payload.tally {
                    self.round.round = final_score;
                }
            }
            GameEventKind::HighScoreBeaten(payload) => self.high_score = payload.score,
            GameEventKind::GameReset(payload) => {
                self.round = RoundState::starting_with(payload.opening);
                self.scores = DualScores::default();
                self.stage = if payload.opening.is_some() {
                    Stage::InRound
                } else if self.registry.has_buttons() {
                    Stage::AwaitingModeChoice
                } else {
                    Stage::AwaitingRegistration
                };
            }
            GameEventKind::SessionStopped(payload) => {
                self.stage = Stage::Stopped;
                self.registry.release();
                if let Some(final_score) = payload.final_score {
                    self.round.round = final_score;
                }
            }
        }
    }

    /// Opens the session for `player_id`, carrying their best score.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session was already launched.
    pub fn launch(
        &mut self,
        player_id: Uuid,
        high_score: u32,
        catalog: &ScenarioCatalog,
        config: &GameConfig,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Outcome, DomainError> {
        if self.stage != Stage::Unlaunched {
            return Err(DomainError::Validation(
                "session has already been launched".to_owned(),
            ));
        }

        self.record(
            GameEventKind::SessionLaunched(SessionLaunched {
                session_id: self.id,
                player_id,
                high_score,
                catalog_digest: catalog.digest().to_owned(),
            }),
            correlation_id,
            clock,
        );
        info!(session_id = %self.id, %player_id, high_score, "session launched");

        Ok(Outcome::spoken(
            narration::welcome(high_score),
            narration::WELCOME_REPROMPT,
            self.score_summary(),
        )
        .with_window(Some(config.registration_window_ms)))
    }

    /// Runs one input through the game.
    ///
    /// Player mistakes come back as an `Outcome` with a rejection; only misuse
    /// of the session itself is an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session was never launched, was
    /// recorded against a different catalog, or a press has no source id.
    /// Returns `DomainError::SessionClosed` if the session was stopped.
    /// Returns `DomainError::Infrastructure` if the RNG cannot deal a scenario.
    pub fn handle_input(
        &mut self,
        input: &InputEvent,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        match self.stage {
            Stage::Unlaunched => {
                return Err(DomainError::Validation(
                    "session has not been launched".to_owned(),
                ));
            }
            Stage::Stopped => return Err(DomainError::SessionClosed(self.id)),
            _ => {}
        }
        if self.catalog_digest.as_deref() != Some(ctx.catalog.digest()) {
            return Err(DomainError::Validation(
                "session was recorded against a different scenario catalog".to_owned(),
            ));
        }

        match input.kind {
            InputKind::ButtonPressed => self.on_press(input, ctx, rng),
            InputKind::Timeout => self.on_timeout(input, ctx, rng),
            InputKind::Reset => self.on_reset(ctx),
            InputKind::Stop => Ok(self.on_stop(ctx)),
            InputKind::Voice(utterance) => self.on_voice(utterance, ctx, rng),
        }
    }

    fn on_press(
        &mut self,
        input: &InputEvent,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        let gadget = input.source_id.clone().ok_or_else(|| {
            DomainError::Validation("button press without a source id".to_owned())
        })?;

        let threshold = self.registry.debounce_threshold_secs(ctx.config);
        let gap = self.debouncer.evaluate(input.timestamp, threshold);
        self.record(
            GameEventKind::GadgetEventObserved(GadgetEventObserved {
                at: input.timestamp,
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        if gap == PressGap::Suppressed {
            debug!(session_id = %self.id, %gadget, "press suppressed");
            return Ok(Outcome::silent(self.score_summary()).rejecting(InputRejection::Spurious));
        }

        if self.stage == Stage::GameOver {
            return Ok(self
                .game_over_prompt()
                .rejecting(InputRejection::ActionAfterGameOver));
        }

        match self.registry.resolve(self.mode, &gadget) {
            PressResolution::FirstRegistered => self.register_first(gadget, ctx),
            PressResolution::SecondRegistered => self.register_second(gadget, ctx),
            PressResolution::Duplicate => {
                warn!(session_id = %self.id, %gadget, "duplicate registration press");
                Ok(Outcome::spoken(
                    narration::DUPLICATE_BUTTON.to_owned(),
                    narration::DUPLICATE_BUTTON_REPROMPT,
                    self.score_summary(),
                )
                .with_window(self.input_window(ctx)?)
                .rejecting(InputRejection::InvalidRegistration {
                    problem: RegistrationProblem::Duplicate,
                }))
            }
            PressResolution::Extra => {
                warn!(session_id = %self.id, %gadget, "extra controller press");
                Ok(Outcome::spoken(
                    narration::EXTRA_BUTTON.to_owned(),
                    narration::EXTRA_BUTTON_REPROMPT,
                    self.score_summary(),
                )
                .with_window(self.input_window(ctx)?)
                .rejecting(InputRejection::InvalidRegistration {
                    problem: RegistrationProblem::Extra,
                }))
            }
            PressResolution::Action(role) => self.on_action(role, ctx, rng),
        }
    }

    fn register_first(
        &mut self,
        gadget: GadgetId,
        ctx: &TurnContext<'_>,
    ) -> Result<Outcome, DomainError> {
        info!(session_id = %self.id, %gadget, "red button registered");
        self.record(
            GameEventKind::ButtonRegistered(ButtonRegistered {
                role: Role::Red,
                gadget_id: gadget,
            }),
            ctx.correlation_id,
            ctx.clock,
        );

        let outcome = if self.stage.is_setup() {
            Outcome::spoken(
                narration::FIRST_BUTTON_REGISTERED.to_owned(),
                narration::SECOND_PLAYER_REPROMPT,
                self.score_summary(),
            )
        } else {
            // Voice-only solo player picked up a button mid-game.
            let current = self.scenario_in_play(ctx.catalog)?;
            Outcome::spoken(
                narration::button_activated(current),
                narration::scenario_reprompt(current),
                self.score_summary(),
            )
        };
        Ok(outcome
            .with_window(self.input_window(ctx)?)
            .with_lights(vec![LightHint::new(Role::Red, ColorState::Red)]))
    }

    fn register_second(
        &mut self,
        gadget: GadgetId,
        ctx: &TurnContext<'_>,
    ) -> Result<Outcome, DomainError> {
        let opening = ctx.catalog.opening();
        self.record(
            GameEventKind::ButtonRegistered(ButtonRegistered {
                role: Role::Blue,
                gadget_id: gadget,
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        self.record(
            GameEventKind::GameStarted(GameStarted {
                mode: GameMode::Dual,
                opening,
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(session_id = %self.id, "two-player game started");

        let scenario = ctx.catalog.scenario(opening)?;
        Ok(Outcome::spoken(
            narration::dual_start(scenario),
            narration::scenario_reprompt(scenario),
            self.score_summary(),
        )
        .with_window(self.input_window(ctx)?)
        .with_lights(self.role_lights()))
    }

    fn start_solo(&mut self, ctx: &TurnContext<'_>) -> Result<Outcome, DomainError> {
        let opening = ctx.catalog.opening();
        self.record(
            GameEventKind::GameStarted(GameStarted {
                mode: GameMode::Solo,
                opening,
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(
            session_id = %self.id,
            buttons = self.registry.has_buttons(),
            "solo game started"
        );

        let scenario = ctx.catalog.scenario(opening)?;
        Ok(Outcome::spoken(
            narration::solo_start(scenario),
            narration::scenario_reprompt(scenario),
            self.score_summary(),
        )
        .with_window(self.input_window(ctx)?)
        .with_lights(self.role_lights()))
    }

    fn on_action(
        &mut self,
        role: Role,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        if self.stage != Stage::InRound {
            return self.clarify(ctx);
        }
        if self.mode == GameMode::Dual && self.scores.is_eliminated(role) {
            debug!(session_id = %self.id, %role, "press from eliminated role");
            return Ok(Outcome::silent(self.score_summary())
                .rejecting(InputRejection::EliminatedRole { role }));
        }
        self.play(Signal::Action(role), ctx, rng)
    }

    fn on_timeout(
        &mut self,
        input: &InputEvent,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        // Timer expiries are never suppressed, but the next press is measured
        // from them.
        self.record(
            GameEventKind::GadgetEventObserved(GadgetEventObserved {
                at: input.timestamp,
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        if self.stage != Stage::InRound {
            debug!(session_id = %self.id, stage = ?self.stage, "timeout outside a round");
            return Ok(Outcome::silent(self.score_summary()));
        }
        self.play(Signal::Timeout, ctx, rng)
    }

    fn play(
        &mut self,
        signal: Signal,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        let dealt = self
            .round
            .scenario
            .ok_or_else(|| DomainError::Validation("no scenario in play".to_owned()))?;
        let played = ctx.catalog.scenario(dealt)?;
        let verdict = judge(dealt.requires_reaction, signal);
        debug!(
            session_id = %self.id,
            scenario = %played.name,
            round = self.round.round,
            ?verdict,
            "signal judged"
        );

        match verdict {
            Verdict::GoodHit(_) | Verdict::HeldFire => self.advance(verdict, played, ctx, rng),
            Verdict::Trouble(role) if self.mode == GameMode::Dual => {
                self.eliminate(role, played, ctx, rng)
            }
            Verdict::TooLate if self.mode == GameMode::Dual => {
                Ok(self.end_dual(EndReason::TooLate, played, ctx, Vec::new()))
            }
            Verdict::Trouble(_) => Ok(self.end_solo(EndReason::Trouble, played, ctx)),
            Verdict::TooLate => Ok(self.end_solo(EndReason::TooLate, played, ctx)),
        }
    }

    fn advance(
        &mut self,
        verdict: Verdict,
        played: &Scenario,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        let next_dealt = ctx.catalog.draw(rng)?;
        let thrower = match verdict {
            Verdict::GoodHit(role) => Some(role),
            _ => None,
        };
        let credited = thrower.filter(|_| self.mode == GameMode::Dual);
        self.record(
            GameEventKind::RoundAdvanced(RoundAdvanced {
                credited,
                next: next_dealt,
            }),
            ctx.correlation_id,
            ctx.clock,
        );

        let next = ctx.catalog.scenario(next_dealt)?;
        let text = if self.mode == GameMode::Dual {
            narration::dual_success(played, credited, &self.scores, self.round.round, next)
        } else {
            narration::solo_success(
                played,
                solo_final_score(self.round.round),
                next,
                thrower.is_some(),
            )
        };
        let lights = thrower
            .filter(|role| self.registry.registered_roles().contains(role))
            .map(|role| vec![LightHint::new(role, role.color())])
            .unwrap_or_default();

        Ok(
            Outcome::spoken(text, narration::scenario_reprompt(next), self.score_summary())
                .with_window(self.input_window(ctx)?)
                .with_lights(lights),
        )
    }

    fn eliminate(
        &mut self,
        role: Role,
        played: &Scenario,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        let knocked_out = vec![LightHint::new(role, ColorState::Eliminated)];

        if self.scores.is_eliminated(role.other()) {
            self.record(
                GameEventKind::PlayerEliminated(PlayerEliminated { role, next: None }),
                ctx.correlation_id,
                ctx.clock,
            );
            return Ok(self.end_dual(EndReason::AllEliminated, played, ctx, knocked_out));
        }

        let next_dealt = ctx.catalog.draw(rng)?;
        self.record(
            GameEventKind::PlayerEliminated(PlayerEliminated {
                role,
                next: Some(next_dealt),
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(session_id = %self.id, %role, "player eliminated");

        let next = ctx.catalog.scenario(next_dealt)?;
        Ok(Outcome::spoken(
            narration::elimination(played, role, self.round.round, next),
            narration::scenario_reprompt(next),
            self.score_summary(),
        )
        .with_window(self.input_window(ctx)?)
        .with_lights(knocked_out))
    }

    fn end_solo(&mut self, reason: EndReason, played: &Scenario, ctx: &TurnContext<'_>) -> Outcome {
        let final_score = solo_final_score(self.round.round);
        self.record(
            GameEventKind::GameEnded(GameEnded {
                reason,
                tally: FinalTally::Solo { final_score },
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        let beaten = self.beat_high_score(final_score, ctx);
        info!(session_id = %self.id, ?reason, final_score, beaten, "solo game over");

        Outcome::spoken(
            narration::solo_game_over(
                played,
                final_score,
                beaten,
                self.registry.has_buttons(),
                ctx.config,
            ),
            narration::TRY_AGAIN_REPROMPT,
            self.score_summary(),
        )
        .ending_game()
    }

    fn end_dual(
        &mut self,
        reason: EndReason,
        played: &Scenario,
        ctx: &TurnContext<'_>,
        lights: Vec<LightHint>,
    ) -> Outcome {
        let result = self.scores.result();
        self.record(
            GameEventKind::GameEnded(GameEnded {
                reason,
                tally: FinalTally::Dual {
                    red_score: self.scores.red_score,
                    blue_score: self.scores.blue_score,
                    result,
                },
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(session_id = %self.id, ?reason, ?result, "two-player game over");

        Outcome::spoken(
            narration::dual_game_over(played, &self.scores),
            narration::TRY_AGAIN_REPROMPT,
            self.score_summary(),
        )
        .with_lights(lights)
        .ending_game()
    }

    fn beat_high_score(&mut self, score: u32, ctx: &TurnContext<'_>) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.record(
            GameEventKind::HighScoreBeaten(HighScoreBeaten { score }),
            ctx.correlation_id,
            ctx.clock,
        );
        true
    }

    fn on_reset(&mut self, ctx: &TurnContext<'_>) -> Result<Outcome, DomainError> {
        if self.mode == GameMode::Undetermined {
            self.record(
                GameEventKind::GameReset(GameReset { opening: None }),
                ctx.correlation_id,
                ctx.clock,
            );
            return Ok(Outcome::spoken(
                narration::reset_setup(),
                narration::REGISTRATION_REPROMPT,
                self.score_summary(),
            )
            .with_window(self.input_window(ctx)?));
        }

        let opening = ctx.catalog.opening();
        self.record(
            GameEventKind::GameReset(GameReset {
                opening: Some(opening),
            }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(session_id = %self.id, mode = ?self.mode, "game reset");

        let scenario = ctx.catalog.scenario(opening)?;
        Ok(Outcome::spoken(
            narration::reset(scenario, self.registry.has_buttons()),
            narration::scenario_reprompt(scenario),
            self.score_summary(),
        )
        .with_window(self.input_window(ctx)?)
        .with_lights(self.role_lights()))
    }

    fn on_stop(&mut self, ctx: &TurnContext<'_>) -> Outcome {
        let final_score = (self.mode == GameMode::Solo && self.stage == Stage::InRound)
            .then(|| solo_final_score(self.round.round));
        let beaten = final_score.filter(|score| self.beat_high_score(*score, ctx));
        let lights = self
            .registry
            .registered_roles()
            .into_iter()
            .map(|role| LightHint::new(role, ColorState::Off))
            .collect();

        self.record(
            GameEventKind::SessionStopped(SessionStopped { final_score }),
            ctx.correlation_id,
            ctx.clock,
        );
        info!(session_id = %self.id, ?final_score, "session stopped");

        Outcome::narrated(narration::farewell(beaten), self.score_summary())
            .with_lights(lights)
            .ending_session()
    }

    fn on_voice(
        &mut self,
        utterance: Utterance,
        ctx: &TurnContext<'_>,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        if self.stage == Stage::GameOver {
            let outcome = self.game_over_prompt();
            return Ok(if utterance == Utterance::Throw {
                outcome.rejecting(InputRejection::ActionAfterGameOver)
            } else {
                outcome
            });
        }

        match (utterance, self.stage) {
            (Utterance::Affirm, Stage::AwaitingRegistration) => Ok(Outcome::spoken(
                narration::REGISTRATION_PROMPT.to_owned(),
                narration::REGISTRATION_REPROMPT,
                self.score_summary(),
            )
            .with_window(self.input_window(ctx)?)),
            (Utterance::Affirm, Stage::AwaitingModeChoice) => Ok(Outcome::spoken(
                narration::SECOND_PLAYER_REPROMPT.to_owned(),
                narration::SECOND_PLAYER_REPROMPT,
                self.score_summary(),
            )
            .with_window(self.input_window(ctx)?)),
            (Utterance::Decline, stage) if stage.is_setup() => self.start_solo(ctx),
            (Utterance::Decline, Stage::InRound) => {
                debug!(session_id = %self.id, "stray 'no' during a round");
                Ok(Outcome::silent(self.score_summary()))
            }
            (Utterance::Throw, Stage::InRound) if self.mode == GameMode::Solo => {
                self.play(Signal::Action(Role::Red), ctx, rng)
            }
            (Utterance::Help, _) => {
                let (text, reprompt) = narration::help(self.scenario_if_in_round(ctx.catalog)?);
                Ok(Outcome::spoken(text, reprompt, self.score_summary())
                    .with_window(self.input_window(ctx)?))
            }
            _ => self.clarify(ctx),
        }
    }

    fn clarify(&self, ctx: &TurnContext<'_>) -> Result<Outcome, DomainError> {
        let (text, reprompt) = narration::fallback(self.scenario_if_in_round(ctx.catalog)?);
        Ok(Outcome::spoken(text, reprompt, self.score_summary())
            .with_window(self.input_window(ctx)?)
            .rejecting(InputRejection::Unrecognized))
    }

    fn game_over_prompt(&self) -> Outcome {
        Outcome::spoken(
            narration::GAME_OVER_PROMPT.to_owned(),
            narration::GAME_OVER_REPROMPT,
            self.score_summary(),
        )
        .ending_game()
    }

    fn role_lights(&self) -> Vec<LightHint> {
        self.registry
            .registered_roles()
            .into_iter()
            .map(|role| LightHint::new(role, role.color()))
            .collect()
    }

    fn scenario_in_play<'c>(
        &self,
        catalog: &'c ScenarioCatalog,
    ) -> Result<&'c Scenario, DomainError> {
        let dealt = self
            .round
            .scenario
            .ok_or_else(|| DomainError::Validation("no scenario in play".to_owned()))?;
        catalog.scenario(dealt)
    }

    fn scenario_if_in_round<'c>(
        &self,
        catalog: &'c ScenarioCatalog,
    ) -> Result<Option<&'c Scenario>, DomainError> {
        if self.stage == Stage::InRound {
            self.scenario_in_play(catalog).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Listening window for the current stage: the registration window while
    /// setting up, the scenario timeout in a round (extended for two players),
    /// nothing otherwise.
    fn input_window(&self, ctx: &TurnContext<'_>) -> Result<Option<u32>, DomainError> {
        match self.stage {
            Stage::AwaitingRegistration | Stage::AwaitingModeChoice => {
                Ok(Some(ctx.config.registration_window_ms))
            }
            Stage::InRound => {
                let scenario = self.scenario_in_play(ctx.catalog)?;
                let extension = if self.mode == GameMode::Dual {
                    ctx.config.dual_window_extension_ms
                } else {
                    0
                };
                Ok(Some(scenario.timeout_ms.saturating_add(extension)))
            }
            Stage::Unlaunched | Stage::GameOver | Stage::Stopped => Ok(None),
        }
    }
}

impl AggregateRoot for GameSession {
    type Event = GameEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

/// The aggregate root for a player's durable record.
#[derive(Debug)]
pub struct PlayerProfile {
    /// Aggregate identifier (the player ID).
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) high_score: u32,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ProfileEvent>,
}

impl PlayerProfile {
    /// Creates a profile with no history.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            high_score: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Best solo score on record.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Records a new best if `score` beats the current one. Returns whether
    /// anything was recorded.
    #[allow(clippy::cast_possible_wrap)]
    pub fn raise_high_score(
        &mut self,
        score: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        if score <= self.high_score {
            return false;
        }

        let event = ProfileEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: "profile.high_score_raised".to_owned(),
                aggregate_id: self.id,
                sequence_number: self.version + self.uncommitted_events.len() as i64 + 1,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind: ProfileEventKind::HighScoreRaised(HighScoreRaised {
                player_id: self.id,
                high_score: score,
            }),
        };
        self.high_score = score;
        self.uncommitted_events.push(event);
        true
    }
}

impl AggregateRoot for PlayerProfile {
    type Event = ProfileEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            ProfileEventKind::HighScoreRaised(payload) => {
                self.high_score = self.high_score.max(payload.high_score);
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use snowball_core::aggregate::AggregateRoot;
    use snowball_core::error::DomainError;
    use snowball_core::rng::DeterministicRng;
    use snowball_test_support::{FixedClock, MockRng, SequenceRng, fixed_now};
    use uuid::Uuid;

    use super::{GameSession, PlayerProfile, TurnContext};
    use crate::domain::catalog::{Scenario, ScenarioCatalog};
    use crate::domain::commands::{InputEvent, InputKind, Utterance};
    use crate::domain::config::GameConfig;
    use crate::domain::events::GameEventKind;
    use crate::domain::lights::{ColorState, LightHint};
    use crate::domain::outcome::{InputRejection, Outcome, RegistrationProblem};
    use crate::domain::registry::{GadgetId, Role};
    use crate::domain::round::{GameMode, Stage};
    use crate::domain::scoring::ScoreSummary;

    const REACTION: u32 = 0;
    const CALM: u32 = 1;

    fn scenario(name: &str, requires_reaction: bool, timeout_ms: u32) -> Scenario {
        Scenario {
            name: name.to_owned(),
            requires_reaction,
            timeout_ms,
            prompt: format!("The {name} appears."),
            success_text: format!("Well played against the {name}."),
            failure_text: format!("Oops, the {name}."),
        }
    }

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalog::new(vec![
            scenario("snow fort", true, 30_000),
            scenario("mail carrier", false, 20_000),
            scenario("rival", true, 25_000),
        ])
        .unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        fixed_now() + Duration::seconds(secs)
    }

    fn launched(catalog: &ScenarioCatalog, high_score: u32) -> GameSession {
        let mut session = GameSession::new(Uuid::new_v4());
        session
            .launch(
                Uuid::new_v4(),
                high_score,
                catalog,
                &GameConfig::default(),
                Uuid::new_v4(),
                &FixedClock(fixed_now()),
            )
            .unwrap();
        session
    }

    fn try_send(
        session: &mut GameSession,
        catalog: &ScenarioCatalog,
        input: InputEvent,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Outcome, DomainError> {
        let config = GameConfig::default();
        let clock = FixedClock(fixed_now());
        let ctx = TurnContext {
            catalog,
            config: &config,
            clock: &clock,
            correlation_id: Uuid::new_v4(),
        };
        session.handle_input(&input, &ctx, rng)
    }

    fn send(
        session: &mut GameSession,
        catalog: &ScenarioCatalog,
        input: InputEvent,
        rng: &mut dyn DeterministicRng,
    ) -> Outcome {
        try_send(session, catalog, input, rng).unwrap()
    }

    fn solo_voice_game(catalog: &ScenarioCatalog, high_score: u32) -> GameSession {
        let mut session = launched(catalog, high_score);
        send(
            &mut session,
            catalog,
            InputEvent::voice(Utterance::Decline, at(1)),
            &mut MockRng,
        );
        session
    }

    /// Red registered at t=0, Blue at t=1; opening scenario in play.
    fn dual_game(catalog: &ScenarioCatalog) -> GameSession {
        let mut session = launched(catalog, 0);
        send(&mut session, catalog, InputEvent::press("g1", at(0)), &mut MockRng);
        send(&mut session, catalog, InputEvent::press("g2", at(1)), &mut MockRng);
        session
    }

    fn throw(
        session: &mut GameSession,
        catalog: &ScenarioCatalog,
        rng: &mut dyn DeterministicRng,
    ) -> Outcome {
        send(session, catalog, InputEvent::voice(Utterance::Throw, at(5)), rng)
    }

    fn kinds(session: &GameSession) -> Vec<&'static str> {
        session
            .uncommitted_events()
            .iter()
            .map(|e| e.kind.event_type())
            .collect()
    }

    #[test]
    fn test_launch_records_event_and_welcomes_returning_player() {
        // Arrange
        let catalog = catalog();
        let mut session = GameSession::new(Uuid::new_v4());
        let player_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        // Act
        let outcome = session
            .launch(
                player_id,
                4,
                &catalog,
                &GameConfig::default(),
                correlation_id,
                &FixedClock(fixed_now()),
            )
            .unwrap();

        // Assert
        assert_eq!(session.stage(), Stage::AwaitingRegistration);
        assert_eq!(session.player_id(), Some(player_id));
        assert_eq!(outcome.next_input_window_ms, Some(60_000));
        assert!(outcome.narration.unwrap().starts_with("Welcome back"));
        assert_eq!(outcome.score, ScoreSummary::Undetermined { high_score: 4 });

        let events = session.uncommitted_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.sequence_number, 1);
        assert_eq!(events[0].metadata.correlation_id, correlation_id);
        assert_eq!(events[0].metadata.event_type, "game.session_launched");
    }

    #[test]
    fn test_launch_twice_is_rejected() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        let result = session.launch(
            Uuid::new_v4(),
            0,
            &catalog,
            &GameConfig::default(),
            Uuid::new_v4(),
            &FixedClock(fixed_now()),
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_input_before_launch_is_a_validation_error() {
        let catalog = catalog();
        let mut session = GameSession::new(Uuid::new_v4());

        let result = try_send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(0)),
            &mut MockRng,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_different_catalog_is_refused() {
        let catalog = catalog();
        let other = ScenarioCatalog::new(vec![scenario("other", true, 10_000)]).unwrap();
        let mut session = launched(&catalog, 0);

        let result = try_send(
            &mut session,
            &other,
            InputEvent::voice(Utterance::Decline, at(0)),
            &mut MockRng,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_press_without_source_id_is_a_validation_error() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        let result = try_send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::ButtonPressed, at(0)),
            &mut MockRng,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_saying_yes_prompts_for_registration() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Affirm, at(0)),
            &mut MockRng,
        );

        assert_eq!(session.stage(), Stage::AwaitingRegistration);
        assert!(outcome.narration.unwrap().contains("press your first button"));
        assert_eq!(outcome.next_input_window_ms, Some(60_000));
    }

    #[test]
    fn test_saying_no_starts_solo_with_opening_scenario() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Decline, at(0)),
            &mut MockRng,
        );

        assert_eq!(session.stage(), Stage::InRound);
        assert_eq!(session.mode(), GameMode::Solo);
        assert_eq!(session.round().round, 1);
        assert_eq!(session.round().scenario.unwrap().index, 0);
        assert_eq!(outcome.next_input_window_ms, Some(30_000));
        assert!(outcome.narration.unwrap().contains("The snow fort appears."));
    }

    #[test]
    fn test_solo_throw_on_reaction_scenario_advances_round() {
        // Arrange
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        let mut rng = SequenceRng::new(vec![CALM]);

        // Act
        let outcome = throw(&mut session, &catalog, &mut rng);

        // Assert
        assert_eq!(session.round().round, 2);
        assert_eq!(session.round().scenario.unwrap().index, 1);
        assert_eq!(outcome.score, ScoreSummary::Solo { streak: 1, high_score: 0 });
        assert_eq!(outcome.next_input_window_ms, Some(20_000));
        assert!(outcome.lights.is_empty(), "voice-only player has no button to light");
        assert!(!outcome.game_over);
    }

    #[test]
    fn test_solo_timeout_on_calm_scenario_is_held_fire() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        throw(&mut session, &catalog, &mut SequenceRng::new(vec![CALM]));

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(30)),
            &mut SequenceRng::new(vec![REACTION]),
        );

        assert_eq!(session.round().round, 3);
        assert_eq!(session.stage(), Stage::InRound);
        assert!(outcome.narration.unwrap().starts_with("Nice job. No need to throw"));
    }

    #[test]
    fn test_solo_trouble_ends_game_and_beats_lower_high_score() {
        // Arrange
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 1);
        let mut rng = SequenceRng::new(vec![REACTION, REACTION, CALM]);
        for _ in 0..3 {
            throw(&mut session, &catalog, &mut rng);
        }
        assert_eq!(session.round().round, 4);

        // Act
        let outcome = throw(&mut session, &catalog, &mut rng);

        // Assert
        assert!(outcome.game_over);
        assert!(!outcome.end_session);
        assert_eq!(outcome.next_input_window_ms, None);
        assert_eq!(session.stage(), Stage::GameOver);
        assert_eq!(session.round().round, 3);
        assert_eq!(session.high_score(), 3);
        assert_eq!(session.new_high_score(), Some(3));
        assert_eq!(outcome.score, ScoreSummary::Solo { streak: 3, high_score: 3 });
        assert!(outcome.narration.unwrap().contains("Congratulations on a new high score!"));
    }

    #[test]
    fn test_low_final_score_saves_high_score_without_congratulations() {
        // Arrange
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        let mut rng = SequenceRng::new(vec![CALM]);
        throw(&mut session, &catalog, &mut rng);

        // Act
        let outcome = throw(&mut session, &catalog, &mut rng);

        // Assert
        assert!(outcome.game_over);
        assert_eq!(session.high_score(), 1);
        assert_eq!(session.new_high_score(), Some(1));
        let narration = outcome.narration.unwrap();
        assert!(narration.contains("say the word 'throw'"));
        assert!(!narration.contains("Congratulations"));
    }

    #[test]
    fn test_solo_trouble_keeps_higher_high_score() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 5);
        let mut rng = SequenceRng::new(vec![CALM]);
        throw(&mut session, &catalog, &mut rng);

        let outcome = throw(&mut session, &catalog, &mut rng);

        assert!(outcome.game_over);
        assert_eq!(session.high_score(), 5);
        assert_eq!(session.new_high_score(), None);
        assert!(!kinds(&session).contains(&"game.high_score_beaten"));
    }

    #[test]
    fn test_solo_timeout_at_first_round_scores_zero_with_instructions() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(30)),
            &mut MockRng,
        );

        assert!(outcome.game_over);
        assert_eq!(outcome.score, ScoreSummary::Solo { streak: 0, high_score: 0 });
        let narration = outcome.narration.unwrap();
        assert!(narration.contains("Oops, the snow fort."));
        assert!(narration.contains("say the word 'throw'"));
    }

    #[test]
    fn test_action_after_game_over_gets_fixed_prompt() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(30)),
            &mut MockRng,
        );
        let events_before = session.uncommitted_events().len();

        let outcome = throw(&mut session, &catalog, &mut MockRng);

        assert_eq!(outcome.rejection, Some(InputRejection::ActionAfterGameOver));
        assert!(outcome.narration.unwrap().starts_with("Sorry, this game has ended."));
        assert_eq!(session.uncommitted_events().len(), events_before);
    }

    #[test]
    fn test_registration_assigns_red_rejects_duplicate_then_starts_dual() {
        // Arrange
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        // Act
        let first = send(&mut session, &catalog, InputEvent::press("g1", at(0)), &mut MockRng);
        let duplicate = send(&mut session, &catalog, InputEvent::press("g1", at(1)), &mut MockRng);
        let second = send(&mut session, &catalog, InputEvent::press("g2", at(2)), &mut MockRng);

        // Assert
        assert_eq!(first.lights, vec![LightHint::new(Role::Red, ColorState::Red)]);
        assert_eq!(first.next_input_window_ms, Some(60_000));
        assert_eq!(
            duplicate.rejection,
            Some(InputRejection::InvalidRegistration {
                problem: RegistrationProblem::Duplicate
            })
        );
        assert_eq!(
            second.lights,
            vec![
                LightHint::new(Role::Red, ColorState::Red),
                LightHint::new(Role::Blue, ColorState::Blue),
            ]
        );
        assert_eq!(second.next_input_window_ms, Some(38_000));
        assert_eq!(session.mode(), GameMode::Dual);
        assert_eq!(session.stage(), Stage::InRound);
        assert_eq!(session.registry().red(), Some(&GadgetId::new("g1")));
        assert_eq!(session.registry().blue(), Some(&GadgetId::new("g2")));
    }

    #[test]
    fn test_one_button_then_no_starts_solo_with_button() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);
        send(&mut session, &catalog, InputEvent::press("g1", at(0)), &mut MockRng);

        let start = send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Decline, at(1)),
            &mut MockRng,
        );
        let hit = send(
            &mut session,
            &catalog,
            InputEvent::press("g7", at(2)),
            &mut SequenceRng::new(vec![CALM]),
        );

        assert_eq!(start.lights, vec![LightHint::new(Role::Red, ColorState::Red)]);
        assert_eq!(session.mode(), GameMode::Solo);
        assert_eq!(session.round().round, 2);
        assert_eq!(hit.lights, vec![LightHint::new(Role::Red, ColorState::Red)]);
    }

    #[test]
    fn test_voice_only_player_pressing_a_button_activates_it() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);

        let outcome = send(&mut session, &catalog, InputEvent::press("g1", at(3)), &mut MockRng);

        assert_eq!(session.stage(), Stage::InRound);
        assert_eq!(session.round().round, 1);
        assert_eq!(session.registry().red(), Some(&GadgetId::new("g1")));
        assert!(outcome.narration.unwrap().starts_with("Great. The button is now active"));
        assert_eq!(outcome.next_input_window_ms, Some(30_000));
    }

    #[test]
    fn test_third_controller_is_extra() {
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        let outcome = send(&mut session, &catalog, InputEvent::press("g3", at(10)), &mut MockRng);

        assert_eq!(
            outcome.rejection,
            Some(InputRejection::InvalidRegistration {
                problem: RegistrationProblem::Extra
            })
        );
        assert_eq!(session.scores().total(), 0);
    }

    #[test]
    fn test_press_within_debounce_gap_is_suppressed() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        // Act
        let outcome = send(&mut session, &catalog, InputEvent::press("g1", at(3)), &mut MockRng);

        // Assert
        assert_eq!(outcome.rejection, Some(InputRejection::Spurious));
        assert_eq!(outcome.narration, None);
        assert!(!outcome.end_session);
        assert_eq!(session.round().round, 1);
        assert_eq!(session.scores().red_score, 0);
        assert_eq!(session.debouncer.last_event(), Some(at(3)));
        assert_eq!(kinds(&session).last(), Some(&"game.gadget_event_observed"));
    }

    #[test]
    fn test_dual_red_hit_scores_for_red_only() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        // Act
        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::press("g1", at(10)),
            &mut SequenceRng::new(vec![CALM]),
        );

        // Assert
        assert_eq!(session.scores().red_score, 1);
        assert_eq!(session.scores().blue_score, 0);
        assert_eq!(session.stage(), Stage::InRound);
        assert_eq!(session.round().scenario.unwrap().index, 1);
        assert_eq!(outcome.next_input_window_ms, Some(28_000));
        assert_eq!(outcome.lights, vec![LightHint::new(Role::Red, ColorState::Red)]);
        assert!(outcome.narration.unwrap().starts_with("Red scores!"));
    }

    #[test]
    fn test_dual_both_eliminated_ends_game_with_winner_by_score() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, CALM]);
        send(&mut session, &catalog, InputEvent::press("g1", at(10)), &mut rng);

        // Act
        let blue_out = send(&mut session, &catalog, InputEvent::press("g2", at(20)), &mut rng);
        let red_out = send(&mut session, &catalog, InputEvent::press("g1", at(30)), &mut rng);

        // Assert
        assert!(!blue_out.game_over);
        assert_eq!(blue_out.lights, vec![LightHint::new(Role::Blue, ColorState::Eliminated)]);
        assert!(red_out.game_over);
        assert_eq!(session.stage(), Stage::GameOver);
        assert_eq!(
            red_out.score,
            ScoreSummary::Dual {
                red_score: 1,
                blue_score: 0,
                red_eliminated: true,
                blue_eliminated: true,
            }
        );
        assert!(red_out.narration.unwrap().contains("Red wins!"));
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn test_eliminated_role_press_is_silent() {
        let catalog = catalog();
        let mut session = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, CALM]);
        send(&mut session, &catalog, InputEvent::press("g1", at(10)), &mut rng);
        send(&mut session, &catalog, InputEvent::press("g2", at(20)), &mut rng);

        let outcome = send(&mut session, &catalog, InputEvent::press("g2", at(30)), &mut rng);

        assert_eq!(
            outcome.rejection,
            Some(InputRejection::EliminatedRole { role: Role::Blue })
        );
        assert_eq!(outcome.narration, None);
        assert_eq!(session.stage(), Stage::InRound);
    }

    #[test]
    fn test_dual_timeout_on_reaction_scenario_ends_game() {
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(40)),
            &mut MockRng,
        );

        assert!(outcome.game_over);
        assert!(outcome.narration.unwrap().contains("It's a tie!"));
    }

    #[test]
    fn test_dual_press_right_after_timeout_is_suppressed() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, CALM]);
        send(&mut session, &catalog, InputEvent::press("g1", at(10)), &mut rng);
        send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(40)),
            &mut rng,
        );

        // Act
        let outcome = send(&mut session, &catalog, InputEvent::press("g2", at(41)), &mut rng);

        // Assert
        assert_eq!(outcome.rejection, Some(InputRejection::Spurious));
        assert_eq!(session.scores().blue_score, 0);
        assert_eq!(session.scores().red_score, 1);
        assert!(!session.scores().is_eliminated(Role::Blue));
        assert_eq!(session.debouncer.last_event(), Some(at(41)));
    }

    #[test]
    fn test_dual_timeout_on_calm_scenario_credits_nobody() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, REACTION]);
        send(&mut session, &catalog, InputEvent::press("g1", at(10)), &mut rng);

        // Act
        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(40)),
            &mut rng,
        );

        // Assert
        assert_eq!(session.scores().red_score, 1);
        assert_eq!(session.scores().blue_score, 0);
        assert_eq!(session.round().round, 3);
        assert_eq!(session.round().scenario.unwrap().index, 0);
        assert_eq!(session.stage(), Stage::InRound);
        assert!(!outcome.game_over);
        assert_eq!(outcome.next_input_window_ms, Some(38_000));
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn test_throw_word_in_dual_mode_asks_for_clarification() {
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        let outcome = throw(&mut session, &catalog, &mut MockRng);

        assert_eq!(outcome.rejection, Some(InputRejection::Unrecognized));
        assert_eq!(session.round().round, 1);
    }

    #[test]
    fn test_stray_no_during_round_is_silent() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Decline, at(4)),
            &mut MockRng,
        );

        assert_eq!(outcome, Outcome::silent(session.score_summary()));
    }

    #[test]
    fn test_timeout_during_setup_is_ignored() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(60)),
            &mut MockRng,
        );

        assert_eq!(outcome.narration, None);
        assert_eq!(session.stage(), Stage::AwaitingRegistration);
        assert_eq!(
            kinds(&session),
            vec!["game.session_launched", "game.gadget_event_observed"]
        );
        assert_eq!(session.debouncer.last_event(), Some(at(60)));
    }

    #[test]
    fn test_help_repeats_current_scene() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Help, at(4)),
            &mut MockRng,
        );

        assert!(outcome.narration.unwrap().ends_with("The snow fort appears."));
        assert_eq!(outcome.rejection, None);
    }

    #[test]
    fn test_reset_restores_first_round_and_keeps_registry() {
        // Arrange
        let catalog = catalog();
        let mut session = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, CALM]);
        send(&mut session, &catalog, InputEvent::press("g1", at(10)), &mut rng);
        send(&mut session, &catalog, InputEvent::press("g2", at(20)), &mut rng);

        // Act
        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Reset, at(30)),
            &mut rng,
        );

        // Assert
        assert_eq!(session.round().round, 1);
        assert_eq!(session.round().scenario.unwrap().index, 0);
        assert_eq!(session.scores().total(), 0);
        assert!(!session.scores().is_eliminated(Role::Blue));
        assert_eq!(session.stage(), Stage::InRound);
        assert!(!outcome.game_over);
        assert!(session.registry().is_complete());
        assert_eq!(outcome.lights.len(), 2);
    }

    #[test]
    fn test_reset_after_game_over_reopens_play() {
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Timeout, at(30)),
            &mut MockRng,
        );

        send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Reset, at(31)),
            &mut MockRng,
        );

        assert_eq!(session.stage(), Stage::InRound);
        assert_eq!(session.round().round, 1);
        assert_eq!(session.score_summary(), ScoreSummary::Solo { streak: 0, high_score: 0 });
    }

    #[test]
    fn test_reset_before_mode_choice_returns_to_setup() {
        let catalog = catalog();
        let mut session = launched(&catalog, 0);
        send(&mut session, &catalog, InputEvent::press("g1", at(0)), &mut MockRng);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Reset, at(1)),
            &mut MockRng,
        );

        assert_eq!(session.stage(), Stage::AwaitingModeChoice);
        assert_eq!(outcome.next_input_window_ms, Some(60_000));
    }

    #[test]
    fn test_stop_mid_game_banks_completed_rounds_and_closes_session() {
        // Arrange
        let catalog = catalog();
        let mut session = solo_voice_game(&catalog, 0);
        throw(&mut session, &catalog, &mut SequenceRng::new(vec![REACTION]));

        // Act
        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Stop, at(9)),
            &mut MockRng,
        );

        // Assert
        assert!(outcome.end_session);
        assert_eq!(outcome.reprompt, None);
        assert_eq!(
            outcome.narration.as_deref(),
            Some("Thanks for playing Snowball Fight! Great job on the new high score of 1.")
        );
        assert_eq!(session.stage(), Stage::Stopped);
        assert_eq!(session.high_score(), 1);
        assert!(!session.registry().has_buttons());

        let after = try_send(
            &mut session,
            &catalog,
            InputEvent::voice(Utterance::Affirm, at(10)),
            &mut MockRng,
        );
        assert!(matches!(after, Err(DomainError::SessionClosed(id)) if id == session.id));
    }

    #[test]
    fn test_stop_turns_registered_lights_off() {
        let catalog = catalog();
        let mut session = dual_game(&catalog);

        let outcome = send(
            &mut session,
            &catalog,
            InputEvent::of(InputKind::Stop, at(9)),
            &mut MockRng,
        );

        assert_eq!(
            outcome.lights,
            vec![
                LightHint::new(Role::Red, ColorState::Off),
                LightHint::new(Role::Blue, ColorState::Off),
            ]
        );
        assert_eq!(outcome.narration.as_deref(), Some("Thanks for playing Snowball Fight!"));
    }

    #[test]
    fn test_replaying_recorded_events_rebuilds_state() {
        // Arrange
        let catalog = catalog();
        let mut live = dual_game(&catalog);
        let mut rng = SequenceRng::new(vec![CALM, REACTION]);
        send(&mut live, &catalog, InputEvent::press("g1", at(10)), &mut rng);
        send(&mut live, &catalog, InputEvent::press("g2", at(20)), &mut rng);

        // Act
        let mut replayed = GameSession::new(live.id);
        for event in live.uncommitted_events() {
            replayed.apply(event);
        }

        // Assert
        assert_eq!(replayed.version(), i64::try_from(live.uncommitted_events().len()).unwrap());
        assert!(replayed.uncommitted_events().is_empty());
        assert_eq!(replayed.stage(), live.stage());
        assert_eq!(replayed.mode(), live.mode());
        assert_eq!(replayed.round(), live.round());
        assert_eq!(replayed.scores(), live.scores());
        assert_eq!(replayed.registry(), live.registry());
        assert_eq!(replayed.debouncer, live.debouncer);
    }

    #[test]
    fn test_sequence_numbers_continue_from_persisted_version() {
        let catalog = catalog();
        let mut live = launched(&catalog, 0);
        let mut replayed = GameSession::new(live.id);
        for event in live.uncommitted_events() {
            replayed.apply(event);
        }
        live.clear_uncommitted_events();

        send(
            &mut replayed,
            &catalog,
            InputEvent::voice(Utterance::Decline, at(1)),
            &mut MockRng,
        );

        let events = replayed.uncommitted_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.sequence_number, 2);
        assert!(matches!(events[0].kind, GameEventKind::GameStarted(_)));
    }

    #[test]
    fn test_profile_raises_only_on_strictly_greater_score() {
        let mut profile = PlayerProfile::new(Uuid::new_v4());
        let clock = FixedClock(fixed_now());

        assert!(profile.raise_high_score(3, Uuid::new_v4(), &clock));
        assert!(!profile.raise_high_score(3, Uuid::new_v4(), &clock));
        assert!(!profile.raise_high_score(2, Uuid::new_v4(), &clock));

        assert_eq!(profile.high_score(), 3);
        assert_eq!(profile.uncommitted_events().len(), 1);
        assert_eq!(profile.uncommitted_events()[0].metadata.sequence_number, 1);
    }
}
