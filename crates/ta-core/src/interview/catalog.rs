//! Curated interview probes keyed by (scale id, deviation direction).
//!
//! The table is immutable and process-wide; generation only reads it.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::matching::penalty::Direction;

#[derive(Debug, Clone, Copy)]
pub struct CatalogQuestion {
    pub id: &'static str,
    pub text: &'static str,
    pub category: &'static str,
}

macro_rules! probes {
    ($($id:literal => $text:literal @ $category:literal),+ $(,)?) => {
        vec![$(CatalogQuestion { id: $id, text: $text, category: $category }),+]
    };
}

lazy_static! {
    pub static ref QUESTION_CATALOG: HashMap<(&'static str, Direction), Vec<CatalogQuestion>> = {
        let mut m = HashMap::new();

        m.insert(("assertiveness", Direction::High), probes![
            "assertiveness-high-1" => "Tell me about a time a colleague told you that you came on too strong. What did you change afterwards?" @ "behavioral",
            "assertiveness-high-2" => "Describe a decision you pushed through over the team's objections. How did you bring people along afterwards?" @ "behavioral",
            "assertiveness-high-3" => "When has holding your position damaged a working relationship, and what did you do to repair it?" @ "probing",
        ]);
        m.insert(("assertiveness", Direction::Low), probes![
            "assertiveness-low-1" => "Tell me about a time you disagreed with a decision but said nothing. What held you back?" @ "behavioral",
            "assertiveness-low-2" => "Describe a situation where you had to deliver an unpopular message. How did you handle it?" @ "situational",
        ]);

        m.insert(("sociability", Direction::High), probes![
            "sociability-high-1" => "Describe a stretch of solitary, heads-down work you completed recently. How did you keep yourself engaged?" @ "behavioral",
            "sociability-high-2" => "How do you stop collaboration from crowding out your own deliverables?" @ "probing",
        ]);
        m.insert(("sociability", Direction::Low), probes![
            "sociability-low-1" => "Walk me through how you built a working relationship with someone you rarely see." @ "behavioral",
            "sociability-low-2" => "This role involves frequent unplanned contact with strangers. What in your experience tells you that will work for you?" @ "situational",
        ]);

        m.insert(("conscientiousness", Direction::High), probes![
            "conscientiousness-high-1" => "Tell me about a deadline that forced you to ship something below your own standard. How did you decide what to let go?" @ "behavioral",
            "conscientiousness-high-2" => "When has your attention to detail slowed a team down, and what did you do about it?" @ "probing",
        ]);
        m.insert(("conscientiousness", Direction::Low), probes![
            "conscientiousness-low-1" => "Describe a piece of work where the details really mattered. How did you make sure nothing slipped?" @ "behavioral",
            "conscientiousness-low-2" => "What systems do you rely on to keep long-running commitments from falling through?" @ "probing",
        ]);

        m.insert(("emotional_stability", Direction::High), probes![
            "stability-high-1" => "Tell me about a setback that genuinely got to you. How would a colleague have known?" @ "probing",
            "stability-high-2" => "When calm isn't read as confidence but as detachment, how do you correct the impression?" @ "situational",
        ]);
        m.insert(("emotional_stability", Direction::Low), probes![
            "stability-low-1" => "Describe the most stressful period in your last role. What did it look like day to day, and what helped?" @ "behavioral",
            "stability-low-2" => "Tell me about a time criticism landed badly with you. What did you do in the following week?" @ "behavioral",
        ]);

        m.insert(("cooperativeness", Direction::High), probes![
            "cooperativeness-high-1" => "Tell me about a time accommodating everyone produced a worse outcome. What would you do differently?" @ "behavioral",
            "cooperativeness-high-2" => "When did you last say no to a stakeholder? How did you frame it?" @ "probing",
        ]);
        m.insert(("cooperativeness", Direction::Low), probes![
            "cooperativeness-low-1" => "Describe a conflict with a peer that you resolved without escalating. What was your part in it?" @ "behavioral",
            "cooperativeness-low-2" => "Tell me about feedback you've received on how you handle disagreement." @ "probing",
        ]);

        m.insert(("energy", Direction::High), probes![
            "energy-high-1" => "Tell me about a long project with little visible progress. How did you pace yourself?" @ "behavioral",
            "energy-high-2" => "How do you keep starting new threads from leaving earlier ones unfinished?" @ "probing",
        ]);
        m.insert(("energy", Direction::Low), probes![
            "energy-low-1" => "Describe the busiest week you've had at work. What did you deprioritize and why?" @ "behavioral",
            "energy-low-2" => "This role has sustained periods of high throughput. What tells you you can hold that pace?" @ "situational",
        ]);

        m
    };
}

/// Fallback templates for scales without curated probes. `{scale}` is
/// interpolated with the scale's display name.
pub const GENERIC_HIGH_TEMPLATES: [(&str, &str); 2] = [
    (
        "generic-high-1",
        "Your profile shows notably high {scale}. Tell me about a situation where that worked against you.",
    ),
    (
        "generic-high-2",
        "How do you moderate your {scale} when the situation calls for the opposite?",
    ),
];

pub const GENERIC_LOW_TEMPLATES: [(&str, &str); 2] = [
    (
        "generic-low-1",
        "Your profile shows lower {scale} than this role typically calls for. How have you compensated in the past?",
    ),
    (
        "generic-low-2",
        "Describe a situation that demanded more {scale} than comes naturally to you. How did it go?",
    ),
];
