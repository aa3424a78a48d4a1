use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Doctor {
    #[serde(rename = "Dr. Sharma")]
    Sharma,
    #[serde(rename = "Dr. Patel")]
    Patel,
    #[serde(rename = "Dr. Mehta")]
    Mehta,
}

impl Doctor {
    pub const ALL: [Doctor; 3] = [Doctor::Sharma, Doctor::Patel, Doctor::Mehta];

    pub fn name(&self) -> &'static str {
        match self {
            Doctor::Sharma => "Dr. Sharma",
            Doctor::Patel => "Dr. Patel",
            Doctor::Mehta => "Dr. Mehta",
        }
    }

    /// Accepts "Dr. Sharma", "dr sharma" or just "sharma". Anything else is not a doctor we have.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let surname = lower
            .strip_prefix("dr.")
            .or_else(|| lower.strip_prefix("dr "))
            .unwrap_or(&lower)
            .trim();

        match surname {
            "sharma" => Some(Doctor::Sharma),
            "patel" => Some(Doctor::Patel),
            "mehta" => Some(Doctor::Mehta),
            _ => None,
        }
    }
}

impl std::fmt::Display for Doctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeSlot {
    #[serde(rename = "09:00 AM")]
    NineAm,
    #[serde(rename = "10:00 AM")]
    TenAm,
    #[serde(rename = "10:30 AM")]
    TenThirtyAm,
    #[serde(rename = "11:30 AM")]
    ElevenThirtyAm,
    #[serde(rename = "12:00 PM")]
    Noon,
    #[serde(rename = "02:00 PM")]
    TwoPm,
    #[serde(rename = "03:00 PM")]
    ThreePm,
    #[serde(rename = "04:30 PM")]
    FourThirtyPm,
    #[serde(rename = "05:00 PM")]
    FivePm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 9] = [
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::TenThirtyAm,
        TimeSlot::ElevenThirtyAm,
        TimeSlot::Noon,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourThirtyPm,
        TimeSlot::FivePm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::NineAm => "09:00 AM",
            TimeSlot::TenAm => "10:00 AM",
            TimeSlot::TenThirtyAm => "10:30 AM",
            TimeSlot::ElevenThirtyAm => "11:30 AM",
            TimeSlot::Noon => "12:00 PM",
            TimeSlot::TwoPm => "02:00 PM",
            TimeSlot::ThreePm => "03:00 PM",
            TimeSlot::FourThirtyPm => "04:30 PM",
            TimeSlot::FivePm => "05:00 PM",
        }
    }

    /// Matches a label ignoring case, whitespace and hour padding ("2:00 pm" == "02:00 PM").
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = normalize_slot(s);
        Self::ALL
            .into_iter()
            .find(|slot| normalize_slot(slot.label()) == wanted)
    }
}

fn normalize_slot(s: &str) -> String {
    let mut out: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if out.find(':') == Some(1) {
        out.insert(0, '0');
    }
    out
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStage {
    Empty,
    DoctorSet,
    DateSet,
    TimeSet,
    Confirmed,
}

/// Result of applying one booking action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Stage moved forward; carries the single assistant prompt for the new stage.
    Advanced(String),
    /// A field already set was replaced. Stage unchanged, nothing to say.
    Updated,
    /// Same value selected again.
    Unchanged,
    /// Out of order, incomplete, or after confirmation. State untouched.
    Rejected,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Advanced(_) => "advanced",
            Transition::Updated => "updated",
            Transition::Unchanged => "unchanged",
            Transition::Rejected => "rejected",
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            Transition::Advanced(prompt) => Some(prompt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookingState {
    pub doctor: Option<Doctor>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub patient_name: Option<String>,
    pub confirmed: bool,
}

impl BookingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> BookingStage {
        if self.confirmed {
            return BookingStage::Confirmed;
        }
        match (self.doctor, self.date, self.time) {
            (Some(_), Some(_), Some(_)) => BookingStage::TimeSet,
            (Some(_), Some(_), None) => BookingStage::DateSet,
            (Some(_), None, _) => BookingStage::DoctorSet,
            (None, _, _) => BookingStage::Empty,
        }
    }

    pub fn select_doctor(&mut self, doctor: Doctor) -> Transition {
        if self.confirmed {
            return Transition::Rejected;
        }
        match self.doctor {
            None => {
                self.doctor = Some(doctor);
                Transition::Advanced(format!(
                    "✅ Appointment request noted for {doctor}. Please select a preferred date and time below."
                ))
            }
            Some(current) if current == doctor => Transition::Unchanged,
            Some(_) => {
                self.doctor = Some(doctor);
                Transition::Updated
            }
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Transition {
        if self.confirmed || self.doctor.is_none() {
            return Transition::Rejected;
        }
        match self.date {
            None => {
                self.date = Some(date);
                Transition::Advanced(
                    "📅 Date selected. Please choose an available time slot.".to_string(),
                )
            }
            Some(current) if current == date => Transition::Unchanged,
            Some(_) => {
                self.date = Some(date);
                Transition::Updated
            }
        }
    }

    pub fn select_time(&mut self, slot: TimeSlot) -> Transition {
        if self.confirmed || self.date.is_none() {
            return Transition::Rejected;
        }
        match self.time {
            None => {
                self.time = Some(slot);
                Transition::Advanced(
                    "🕒 Time slot selected. Please confirm your appointment.".to_string(),
                )
            }
            Some(current) if current == slot => Transition::Unchanged,
            Some(_) => {
                self.time = Some(slot);
                Transition::Updated
            }
        }
    }

    /// Terminal transition. Needs doctor, date, time and a non-blank patient name.
    pub fn confirm(&mut self, patient_name: &str) -> Transition {
        let name = patient_name.trim();
        if self.confirmed || name.is_empty() {
            return Transition::Rejected;
        }
        let (Some(doctor), Some(date), Some(time)) = (self.doctor, self.date, self.time) else {
            return Transition::Rejected;
        };

        self.patient_name = Some(name.to_string());
        self.confirmed = true;
        Transition::Advanced(format!(
            "✅ {name}, your appointment with {doctor} is confirmed on {} at {time}.",
            date.format("%Y-%m-%d")
        ))
    }
}
