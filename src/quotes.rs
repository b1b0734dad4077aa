use crate::models::Mood;
use rand::{seq::SliceRandom, Rng};

const HAPPY: [&str; 3] = [
    "Your joy is contagious! Keep spreading that beautiful energy. ✨",
    "Happiness looks amazing on you. Embrace this wonderful feeling! 🌟",
    "You're radiating positivity today. Let this light guide your path! 🌞",
];

const SAD: [&str; 3] = [
    "It's okay to feel sad. Every emotion is valid, and this feeling will pass. 🌙",
    "Your tears water the seeds of your growth. Be gentle with yourself today. 🌱",
    "Even clouds pass away to reveal the sun. You're stronger than you know. ☁️",
];

const ANGRY: [&str; 3] = [
    "Your anger shows you care deeply. Channel this energy into positive change. 🔥",
    "Take a deep breath. This feeling is temporary, but your peace is permanent. 🌊",
    "Anger can be a teacher. What is it trying to tell you about your boundaries? 💪",
];

const ANXIOUS: [&str; 3] = [
    "You've survived 100% of your difficult days so far. You're doing amazing. 🦋",
    "Breathe deeply. You are safe in this moment, and you have the strength to handle whatever comes. 🌸",
    "Anxiety is not your enemy - it's trying to protect you. Thank it, then let it go. 🍃",
];

const CALM: [&str; 3] = [
    "Your inner peace is your superpower. Carry this serenity with you. 🧘‍♀️",
    "In stillness, you find your truest self. This calm is your natural state. 🌊",
    "You are the eye of your own storm - centered, peaceful, and unshakeable. ⭐",
];

pub const SIGNATURE: &str = "Your Wellness Companion";

pub fn quotes_for(mood: Mood) -> &'static [&'static str; 3] {
    match mood {
        Mood::Happy => &HAPPY,
        Mood::Sad => &SAD,
        Mood::Angry => &ANGRY,
        Mood::Anxious => &ANXIOUS,
        Mood::Calm => &CALM,
    }
}

pub fn select_random_quote<R: Rng>(mood: Mood, rng: &mut R) -> &'static str {
    let quotes = quotes_for(mood);
    quotes.choose(rng).copied().unwrap_or(quotes[0])
}
