use crate::errors::AppError;
use crate::notify::Notification;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Therapist {
    pub id: u32,
    pub name: &'static str,
    pub specialties: &'static [&'static str],
    pub rating: f32,
    pub experience: &'static str,
    pub approach: &'static str,
    pub avatar: &'static str,
    pub bio: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Consultation,
    Message,
}

pub static DIRECTORY: [Therapist; 3] = [
    Therapist {
        id: 1,
        name: "Dr. Sarah Chen",
        specialties: &["Anxiety", "Depression", "Mindfulness"],
        rating: 4.9,
        experience: "8 years",
        approach: "Cognitive Behavioral Therapy & Mindfulness-based techniques",
        avatar: "👩‍⚕️",
        bio: "Specializing in anxiety and stress management with a gentle, evidence-based approach.",
    },
    Therapist {
        id: 2,
        name: "Dr. Michael Rodriguez",
        specialties: &["Stress Management", "Life Transitions", "Self-Esteem"],
        rating: 4.8,
        experience: "12 years",
        approach: "Humanistic & Solution-focused therapy",
        avatar: "👨‍⚕️",
        bio: "Helping individuals navigate life changes and build confidence through compassionate care.",
    },
    Therapist {
        id: 3,
        name: "Dr. Emma Thompson",
        specialties: &["Mood Disorders", "Trauma", "Wellness Coaching"],
        rating: 4.9,
        experience: "10 years",
        approach: "Trauma-informed care & Positive Psychology",
        avatar: "👩‍🔬",
        bio: "Empowering clients to heal and thrive using strength-based therapeutic approaches.",
    },
];

pub fn find(id: u32) -> Result<&'static Therapist, AppError> {
    DIRECTORY
        .iter()
        .find(|therapist| therapist.id == id)
        .ok_or_else(|| AppError::NotFound(format!("no therapist with id {id}")))
}

/// Builds the acknowledgement shown after a contact request. Nothing is sent
/// anywhere; the directory is static.
pub fn contact(id: u32, kind: ContactKind) -> Result<Notification, AppError> {
    let therapist = find(id)?;
    let notification = match kind {
        ContactKind::Consultation => Notification::info(
            "Consultation Request Sent! 📅",
            format!(
                "Your request to connect with {} has been submitted. They'll reach out within 24 hours.",
                therapist.name
            ),
        ),
        ContactKind::Message => Notification::info(
            "Message Sent! 💌",
            format!(
                "Your message to {} has been sent. You'll receive a response soon.",
                therapist.name
            ),
        ),
    };
    Ok(notification)
}
