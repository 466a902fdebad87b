use crate::pricing::PriceBreakdown;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Room attributes copied into the draft. A snapshot, not a reference:
/// later edits to the room must not change an in-flight booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSnapshot {
    pub room_type: String,
    pub facilities: RoomFacilities,
    pub meal_plan: MealPlan,
    pub image_refs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomFacilities {
    pub air_conditioned: bool,
    pub bed_count: u32,
    pub hot_water: bool,
    pub minibar: bool,
}

/// Meals bundled with the room rate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

impl MealPlan {
    pub fn inclusions(&self) -> Vec<Meal> {
        let mut meals = Vec::new();
        if self.breakfast {
            meals.push(Meal::Breakfast);
        }
        if self.lunch {
            meals.push(Meal::Lunch);
        }
        if self.dinner {
            meals.push(Meal::Dinner);
        }
        meals
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stay {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl Stay {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occupancy {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub rooms: u32,
}

impl Occupancy {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.adults == 0 {
            return Err(BookingError::NoAdults);
        }
        if self.rooms == 0 {
            return Err(BookingError::NoRooms);
        }
        Ok(())
    }

    /// Guests counted for the booking (infants travel free)
    pub fn total_guests(&self) -> u32 {
        self.adults + self.children
    }
}

/// Guest details collected on the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl GuestContact {
    pub fn validate(&self) -> Result<(), BookingError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(BookingError::MissingContact(field));
            }
        }
        Ok(())
    }
}

/// The in-flight booking between room selection and checkout.
///
/// Written once by the room page, read once by the checkout page,
/// never mutated in between. There is no server-side copy until the
/// payment order is created, so a lost draft means starting over.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub id: Uuid,
    pub room_id: String,
    pub room: RoomSnapshot,
    pub stay: Stay,
    pub occupancy: Occupancy,
    pub price: PriceBreakdown,
    pub food_inclusions: Vec<Meal>,
    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    pub fn new(
        room_id: String,
        room: RoomSnapshot,
        stay: Stay,
        occupancy: Occupancy,
        price: PriceBreakdown,
    ) -> Result<Self, BookingError> {
        occupancy.validate()?;
        let food_inclusions = room.meal_plan.inclusions();
        Ok(Self {
            id: Uuid::new_v4(),
            room_id,
            room,
            stay,
            occupancy,
            price,
            food_inclusions,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("At least one adult is required")]
    NoAdults,

    #[error("At least one room is required")]
    NoRooms,

    #[error("Required contact field '{0}' is missing")]
    MissingContact(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{quote, FeeSchedule};

    fn sample_room() -> RoomSnapshot {
        RoomSnapshot {
            room_type: "Deluxe Suite".to_string(),
            facilities: RoomFacilities {
                air_conditioned: true,
                bed_count: 2,
                hot_water: true,
                minibar: false,
            },
            meal_plan: MealPlan {
                breakfast: true,
                lunch: false,
                dinner: true,
            },
            image_refs: vec!["rooms/deluxe-1.jpg".to_string()],
        }
    }

    fn sample_stay() -> Stay {
        Stay {
            check_in: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        }
    }

    #[test]
    fn test_draft_derives_food_inclusions_from_meal_plan() {
        let occupancy = Occupancy {
            adults: 2,
            children: 0,
            infants: 0,
            rooms: 1,
        };
        let price = quote(
            2000,
            sample_stay().check_in,
            sample_stay().check_out,
            1,
            &FeeSchedule::default(),
        )
        .unwrap();
        let draft = BookingDraft::new(
            "room-42".to_string(),
            sample_room(),
            sample_stay(),
            occupancy,
            price,
        )
        .unwrap();

        assert_eq!(draft.food_inclusions, vec![Meal::Breakfast, Meal::Dinner]);
    }

    #[test]
    fn test_occupancy_requires_adult_and_room() {
        let no_adults = Occupancy {
            adults: 0,
            children: 1,
            infants: 0,
            rooms: 1,
        };
        assert_eq!(no_adults.validate(), Err(BookingError::NoAdults));

        let no_rooms = Occupancy {
            adults: 1,
            children: 0,
            infants: 0,
            rooms: 0,
        };
        assert_eq!(no_rooms.validate(), Err(BookingError::NoRooms));
    }

    #[test]
    fn test_infants_not_counted_as_guests() {
        let occupancy = Occupancy {
            adults: 2,
            children: 1,
            infants: 1,
            rooms: 1,
        };
        assert_eq!(occupancy.total_guests(), 3);
    }

    #[test]
    fn test_contact_rejects_blank_fields() {
        let contact = GuestContact {
            name: "Asha Rao".to_string(),
            email: "  ".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 Hill Road".to_string(),
        };
        assert_eq!(
            contact.validate(),
            Err(BookingError::MissingContact("email"))
        );
    }
}
