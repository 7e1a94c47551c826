use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name for the new user
    pub name: String,
    /// Email address, used as the login identifier
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Password for the new user
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Display name of the user
    pub name: String,
    /// Email address of the user
    pub email: String,
    /// ISO 8601 timestamp when the user was created
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Grant type (must be "password")
    pub grant_type: String,
    /// Email address for authentication
    pub email: String,
    /// Password for authentication
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Token type (e.g., "Bearer")
    pub token_type: String,
    /// Access token
    pub access_token: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantSummary {
    /// Unique identifier for the restaurant
    pub id: Uuid,
    /// Name of the restaurant
    pub name: String,
    /// Free-text location (city or address)
    pub location: String,
    /// Latitude, when known
    pub latitude: Option<f64>,
    /// Longitude, when known
    pub longitude: Option<f64>,
    /// Total number of seats
    pub seating_capacity: i32,
    /// Currently reserved seats
    pub current_occupancy: i32,
    /// Provenance tag: "local" or "external"
    pub source: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRestaurantsResponse {
    /// Restaurants already present in the store, busiest first
    pub stored: Vec<RestaurantSummary>,
    /// Venues freshly ingested from the map-data lookup for the requested city
    pub external: Vec<RestaurantSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    /// Identifier of the item within the restaurant's menu
    pub id: String,
    /// Name of the menu item
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Price of the menu item (as string)
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    /// Star rating, 1 to 5
    pub rating: i32,
    /// Review body
    pub review_text: String,
    /// Display name of the reviewer
    pub author: String,
    /// ISO 8601 timestamp when the review was written
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantDetailResponse {
    #[serde(flatten)]
    pub summary: RestaurantSummary,
    /// Category, when assigned
    pub category: Option<CategoryResponse>,
    /// Average review rating, 0 when unreviewed
    pub avg_rating: f64,
    /// Available menu items, alphabetical
    pub menu: Vec<MenuItemResponse>,
    /// Reviews, newest first
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Identifier of the time slot to book
    pub slot_id: Uuid,
    /// Reservation date, YYYY-MM-DD
    pub date: String,
    /// Number of guests
    pub num_people: i32,
    /// Optional free-text note for the restaurant
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// Unique identifier for the reservation
    pub id: Uuid,
    /// Restaurant the reservation belongs to
    pub restaurant_id: Uuid,
    /// Booked time slot
    pub slot_id: Uuid,
    /// Reservation date, YYYY-MM-DD
    pub date: String,
    /// Number of guests
    pub num_people: i32,
    /// Reservation status
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableSlotResponse {
    /// Identifier of the time slot
    pub slot_id: Uuid,
    /// Slot start time, HH:MM
    pub start_time: String,
    /// Slot end time, HH:MM
    pub end_time: String,
    /// Maximum concurrent guests for the slot
    pub max_capacity: i32,
    /// Seats still available for the requested date
    pub remaining: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Star rating, 1 to 5
    pub rating: i32,
    /// Review body
    pub review_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateReviewResponse {
    /// Unique identifier for the review
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestedRestaurantResponse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub seating_capacity: i32,
    pub current_occupancy: i32,
    /// current_occupancy / seating_capacity
    pub occupancy_rate: f64,
    /// Average review rating, 0 when unreviewed
    pub avg_rating: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopRestaurantResponse {
    pub name: String,
    pub booking_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OccupancyStatsResponse {
    pub avg_occupancy: f64,
    pub max_occupancy: i32,
    pub total_customers: i64,
    pub avg_occupancy_percent: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeekdayCountResponse {
    /// ISO weekday: 1=Monday .. 7=Sunday
    pub day_of_week: i32,
    pub booking_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvenanceStatsResponse {
    /// Provenance tag: "local" or "external"
    pub source: String,
    pub restaurant_count: i64,
    pub total_customers: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub top_restaurants: Vec<TopRestaurantResponse>,
    pub occupancy: OccupancyStatsResponse,
    pub bookings_by_weekday: Vec<WeekdayCountResponse>,
    pub provenance: Vec<ProvenanceStatsResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeakHourResponse {
    pub hour_of_day: i32,
    pub booking_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EfficiencyScoreResponse {
    pub restaurant_id: Uuid,
    pub name: String,
    /// Trailing-window seat utilisation, in [0, 1]
    pub score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPatternResponse {
    pub user_id: Uuid,
    pub name: String,
    pub booking_count: i64,
    pub avg_party_size: f64,
    pub distinct_restaurants: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdvancedStatsResponse {
    pub peak_hours: Vec<PeakHourResponse>,
    /// Cancelled reservations over all reservations
    pub cancellation_rate: f64,
    pub efficiency: Vec<EfficiencyScoreResponse>,
    pub user_patterns: Vec<UserPatternResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRequest {
    /// One of "optimize" or "cleanup"
    pub action: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaintenanceItemResponse {
    pub name: String,
    pub affected: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaintenanceResponse {
    pub action: String,
    pub items: Vec<MaintenanceItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogEntryResponse {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    /// ISO 8601 timestamp
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogsResponse {
    /// 1-based page number
    pub page: i64,
    pub entries: Vec<ActivityLogEntryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableCountResponse {
    pub table: String,
    pub rows: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueryPerformanceResponse {
    pub tables: Vec<TableCountResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}
