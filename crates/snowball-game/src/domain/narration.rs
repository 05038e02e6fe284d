//! Everything the narrator says.
//!
//! Plain text only. Sound effects and markup are the hosting layer's business.

use std::fmt::Write as _;

use super::catalog::Scenario;
use super::config::GameConfig;
use super::registry::Role;
use super::scoring::{DualScores, MatchResult, SkillTier};

pub(crate) const WELCOME_REPROMPT: &str =
    "If you have buttons, please say yes, or press one to begin the registration.";

pub(crate) const REGISTRATION_PROMPT: &str =
    "Please press your first button to begin the registration process.";

pub(crate) const REGISTRATION_REPROMPT: &str = "If you have buttons, please press the first one \
     to begin the registration process, else say no.";

pub(crate) const FIRST_BUTTON_REGISTERED: &str = "Great. The button is now active, and can be \
     used to throw snowballs. Do you want to play a two player game? Say 'No' if you want to \
     play in solo mode, or press another button if you want to add a second player, then we \
     can begin the game.";

pub(crate) const SECOND_PLAYER_REPROMPT: &str = "Is there a second player? If so, please push a \
     second button so we can begin the game, or say 'No'.";

pub(crate) const DUPLICATE_BUTTON: &str =
    "Sorry, you are already using that as your throwing button. Please pick another button to use.";

pub(crate) const DUPLICATE_BUTTON_REPROMPT: &str =
    "Please press a second button, then we can get started with the game.";

pub(crate) const EXTRA_BUTTON: &str = "Sorry, you have already registered two buttons.";

pub(crate) const EXTRA_BUTTON_REPROMPT: &str = "Please only press two buttons.";

pub(crate) const GAME_OVER_PROMPT: &str = "Sorry, this game has ended. Please say 'Start Over' \
     to try again, or 'Stop' if you are done.";

pub(crate) const GAME_OVER_REPROMPT: &str =
    "This game is over. Say 'Start Over' to try again, or say 'Stop' if you are done.";

pub(crate) const TRY_AGAIN_REPROMPT: &str =
    "Ready to try again? Just say 'Start Over' to begin a new game.";

const TRY_AGAIN: &str = "Please say 'Start Over' to try again, or say 'Stop' if you are all done.";

const TRANSITIONS: [&str; 4] = [
    "Here is the next one.",
    "Listen closely. This is next.",
    "What's next? Try this.",
    "Okay, now picture this.",
];

const RULES: &str = "The object of the game is to hit as many good targets as possible with \
     snowballs. Listen carefully to each scene. When there is a good target, throw. When there \
     isn't, hold your fire and let the moment pass. See how many correct responses you can get \
     in a row.";

/// Opening line for a new session.
#[must_use]
pub fn welcome(high_score: u32) -> String {
    if high_score > 1 {
        format!(
            "Welcome back to the snowball fight. Your previous high score is {high_score}. \
             Do you have buttons to play the game with?"
        )
    } else {
        "Welcome to the snowball fight game. Get ready to start throwing snowballs, and \
         ducking into a snow fort. Do you have buttons?"
            .to_owned()
    }
}

/// The milestone line for a streak, if the streak is one of the celebrated ones.
#[must_use]
pub fn milestone(streak: u32) -> Option<&'static str> {
    match streak {
        1 => Some("That was your first one, off to a nice start!"),
        3 => Some("That makes three, great work!"),
        5 => Some("Wow, you are going to get tired. That makes five!"),
        8 => Some("What great aim. Now you have gotten eight in a row!"),
        12 => Some("A dozen in a row. You're getting good at this!"),
        20 => Some("Twenty in a row! Will you ever miss?"),
        _ => None,
    }
}

/// Segue into the next scenario. Picked by round so replays narrate the same.
#[must_use]
pub fn transition(round: u32) -> &'static str {
    TRANSITIONS[round as usize % TRANSITIONS.len()]
}

/// Repeats a scenario when the player stays quiet.
#[must_use]
pub fn scenario_reprompt(scenario: &Scenario) -> String {
    format!("Here is the scene again. {}", scenario.prompt)
}

/// A solo game begins.
#[must_use]
pub fn solo_start(opening: &Scenario) -> String {
    format!("Okay, let's begin a solo match. {}", opening.prompt)
}

/// A second button was registered and a two-player game begins.
#[must_use]
pub fn dual_start(opening: &Scenario) -> String {
    format!(
        "Excellent! You have registered a second button to play a two player game. \
         Now let's get ready to play. {}",
        opening.prompt
    )
}

/// A voice-only solo player pressed a button mid-game.
#[must_use]
pub fn button_activated(current: &Scenario) -> String {
    format!(
        "Great. The button is now active, and can be used to throw snowballs. {}",
        current.prompt
    )
}

/// A correct solo response and the next scene.
#[must_use]
pub fn solo_success(played: &Scenario, streak: u32, next: &Scenario, threw: bool) -> String {
    let mut text = String::new();
    if !threw {
        text.push_str("Nice job. No need to throw a snowball there. ");
    }
    let _ = write!(text, "{} ", played.success_text);
    match milestone(streak) {
        Some(line) => text.push_str(line),
        None => {
            let _ = write!(text, "That makes {streak} in a row.");
        }
    }
    let _ = write!(text, " {} {}", transition(streak), next.prompt);
    text
}

/// A correct two-player response and the next scene.
#[must_use]
pub fn dual_success(
    played: &Scenario,
    scorer: Option<Role>,
    scores: &DualScores,
    round: u32,
    next: &Scenario,
) -> String {
    let mut text = String::new();
    match scorer {
        Some(role) => {
            let _ = write!(text, "{role} scores! {} ", played.success_text);
        }
        None => {
            let _ = write!(
                text,
                "Nice job. No need to throw a snowball there. {} ",
                played.success_text
            );
        }
    }
    let _ = write!(
        text,
        "The score is Red {}, Blue {}. {} {}",
        scores.red_score,
        scores.blue_score,
        transition(round),
        next.prompt
    );
    text
}

/// A role is knocked out and play continues for the other.
#[must_use]
pub fn elimination(played: &Scenario, role: Role, round: u32, next: &Scenario) -> String {
    format!(
        "{} {role} is out of the game. {} {}",
        played.failure_text,
        transition(round),
        next.prompt
    )
}

/// End of a solo game. Finals at or below `min_score` get the instructions
/// reminder instead of the streak, and a new high score is not congratulated.
#[must_use]
pub fn solo_game_over(
    played: &Scenario,
    final_score: u32,
    new_high_score: bool,
    has_buttons: bool,
    config: &GameConfig,
) -> String {
    let mut text = format!("Game over. {} ", played.failure_text);
    if final_score > config.min_score {
        let _ = write!(text, "You were able to get {final_score} correct in a row. ");
        if new_high_score {
            text.push_str("Congratulations on a new high score! ");
            match SkillTier::for_score(final_score, config) {
                Some(SkillTier::Expert) => {
                    text.push_str("You made it to the expert level snowball squad! ");
                }
                Some(SkillTier::Star) => text.push_str("You made it to the star level snowball team! "),
                Some(SkillTier::Advanced) => text.push_str("You are an advanced snowball thrower! "),
                None => {}
            }
        }
    } else if has_buttons {
        text.push_str(
            "Remember, press your button to throw a snowball when there is a good target, \
             and hold your fire when there isn't. ",
        );
    } else {
        text.push_str(
            "Remember, say the word 'throw' when there is a good target, and stay quiet \
             when there isn't. ",
        );
    }
    text.push_str(TRY_AGAIN);
    text
}

/// End of a two-player game.
#[must_use]
pub fn dual_game_over(played: &Scenario, scores: &DualScores) -> String {
    let verdict = match scores.result() {
        MatchResult::Winner(role) => format!("{role} wins!"),
        MatchResult::Tie => "It's a tie!".to_owned(),
    };
    format!(
        "Game over. {} Final score: Red {}, Blue {}. {verdict} {TRY_AGAIN}",
        played.failure_text, scores.red_score, scores.blue_score
    )
}

/// A new game with the same players.
#[must_use]
pub fn reset(opening: &Scenario, has_buttons: bool) -> String {
    let reminder = if has_buttons {
        "Remember, press your button to throw when there is a good target."
    } else {
        "Remember, say 'throw' when there is a good target."
    };
    format!(
        "New game. Now let's get ready to play. {reminder} {}",
        opening.prompt
    )
}

/// A reset before anyone chose how to play.
#[must_use]
pub fn reset_setup() -> String {
    format!("New game. {REGISTRATION_PROMPT} Or say no to play without buttons.")
}

/// Goodbye, with the new best if one was set.
#[must_use]
pub fn farewell(new_high_score: Option<u32>) -> String {
    match new_high_score {
        Some(score) => {
            format!("Thanks for playing Snowball Fight! Great job on the new high score of {score}.")
        }
        None => "Thanks for playing Snowball Fight!".to_owned(),
    }
}

/// Rules plus where the player is. Returns narration and reprompt.
#[must_use]
pub fn help(current: Option<&Scenario>) -> (String, String) {
    match current {
        Some(scenario) => (
            format!("{RULES} Here is the latest scene. {}", scenario.prompt),
            format!(
                "Here is the latest scene. Go ahead and throw, or hold your fire. {}",
                scenario.prompt
            ),
        ),
        None => (
            format!("{RULES} You are currently setting up to begin a game."),
            "Please press a button if you have them, else say no to begin the game.".to_owned(),
        ),
    }
}

/// Clarification for input that means nothing right now. Returns narration and
/// reprompt.
#[must_use]
pub fn fallback(current: Option<&Scenario>) -> (String, String) {
    match current {
        Some(scenario) => (
            format!(
                "Sorry, I didn't understand that. Here is the latest scene. {}",
                scenario.prompt
            ),
            format!(
                "Here is the latest scene. Go ahead and throw, or hold your fire. {}",
                scenario.prompt
            ),
        ),
        None => (
            "Sorry, I didn't understand that. You are currently setting up buttons to begin a \
             game."
                .to_owned(),
            REGISTRATION_REPROMPT.to_owned(),
        ),
    }
}
