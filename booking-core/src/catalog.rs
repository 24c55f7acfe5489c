/// Built-in fallback catalog
///
/// Served whenever the vendor backend is unreachable, answers with a non-2xx
/// status, or mock data is forced through configuration.

use crate::service::{SearchFilters, Service, ServiceType};

#[allow(clippy::too_many_arguments)]
fn service(
    id: u64,
    name: &str,
    service_type: ServiceType,
    base_price: f64,
    location: &str,
    description: &str,
    images: &[&str],
    amenities: &[&str],
    max_capacity: u32,
    rating: f64,
    reviews_count: u32,
    vendor_id: u64,
    business_name: &str,
) -> Service {
    Service {
        id,
        name: name.to_string(),
        description: description.to_string(),
        service_type,
        base_price,
        currency: "USD".to_string(),
        location: location.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
        amenities: amenities.iter().map(|s| s.to_string()).collect(),
        max_capacity: Some(max_capacity),
        rating,
        reviews_count,
        available: true,
        vendor_id: Some(vendor_id),
        business_name: business_name.to_string(),
    }
}

pub fn fallback_services() -> Vec<Service> {
    vec![
        service(
            1,
            "Luxury Beach Villa - Galle",
            ServiceType::Stays,
            450.0,
            "Galle, Southern Province",
            "Beachfront villa in Galle with 4 bedrooms, an infinity pool, private beach access and ocean views. Suited to families and groups.",
            &[
                "https://images.unsplash.com/photo-1582610116397-edb318620f90?w=800",
                "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800",
                "https://images.unsplash.com/photo-1571896349842-33c89424de2d?w=800",
            ],
            &["Private Pool", "Beach Access", "WiFi", "Air Conditioning", "Kitchen", "Parking"],
            8,
            4.9,
            127,
            1,
            "Coastal Paradise Villas",
        ),
        service(
            2,
            "Sigiriya Rock Fortress Day Tour",
            ServiceType::Tours,
            85.0,
            "Sigiriya, Central Province",
            "Guided day trip to the Sigiriya Rock Fortress, a UNESCO World Heritage site, with entrance fees and a traditional lunch.",
            &[
                "https://images.unsplash.com/photo-1566552881560-0be862a7c445?w=800",
                "https://images.unsplash.com/photo-1604486707950-ed2e2e59f3e0?w=800",
            ],
            &["Professional Guide", "Entrance Fees", "Lunch Included", "Hotel Pickup", "Air-conditioned Vehicle"],
            15,
            4.8,
            89,
            2,
            "Heritage Tours Lanka",
        ),
        service(
            3,
            "Luxury SUV with Driver - Colombo",
            ServiceType::Vehicles,
            120.0,
            "Colombo",
            "Premium SUV with an experienced driver for Colombo and the surrounding area. Fuel and insurance included.",
            &[
                "https://images.unsplash.com/photo-1549317661-bd32c8ce0db2?w=800",
                "https://images.unsplash.com/photo-1552519507-da3b142c6e3d?w=800",
            ],
            &["Professional Driver", "Fuel Included", "Insurance", "WiFi", "Air Conditioning", "Child Seats Available"],
            6,
            4.7,
            156,
            3,
            "Elite Travels",
        ),
        service(
            4,
            "Ayurveda Wellness Retreat - Kandy",
            ServiceType::Wellness,
            200.0,
            "Kandy, Central Province",
            "Ayurveda programme in the hills of Kandy with daily consultations, treatments, organic meals and yoga.",
            &[
                "https://images.unsplash.com/photo-1544161515-4ab6ce6db874?w=800",
                "https://images.unsplash.com/photo-1545205597-3d9d02c29597?w=800",
            ],
            &["Ayurveda Treatments", "Yoga Classes", "Organic Meals", "Spa Access", "Meditation Sessions", "Doctor Consultation"],
            2,
            5.0,
            43,
            4,
            "Serenity Wellness Center",
        ),
        service(
            5,
            "Ella Hiking & Tea Plantation Tour",
            ServiceType::Tours,
            75.0,
            "Ella, Uva Province",
            "Full-day hike around Ella covering Little Adam's Peak, the Nine Arch Bridge and a working tea factory.",
            &[
                "https://images.unsplash.com/photo-1559827260-dc66d52bef19?w=800",
                "https://images.unsplash.com/photo-1587974928442-77dc3e0dba72?w=800",
            ],
            &["Professional Guide", "Tea Tasting", "Lunch", "Hotel Pickup", "Bottled Water"],
            12,
            4.9,
            201,
            2,
            "Heritage Tours Lanka",
        ),
        service(
            6,
            "Boutique Hotel in Colombo Fort",
            ServiceType::Stays,
            150.0,
            "Colombo Fort, Western Province",
            "Boutique hotel in central Colombo mixing colonial architecture with modern rooms, close to restaurants and shopping.",
            &[
                "https://images.unsplash.com/photo-1566665797739-1674de7a421a?w=800",
                "https://images.unsplash.com/photo-1578683010236-d716f9a3f461?w=800",
            ],
            &["WiFi", "Breakfast Included", "Rooftop Bar", "Fitness Center", "Concierge", "Airport Transfer"],
            2,
            4.6,
            312,
            5,
            "Fort Heritage Hotels",
        ),
        service(
            7,
            "Whale Watching Tour - Mirissa",
            ServiceType::Tours,
            95.0,
            "Mirissa, Southern Province",
            "Early-morning boat trip from Mirissa to see blue whales and dolphins, with breakfast and a marine biologist guide.",
            &[
                "https://images.unsplash.com/photo-1559827260-dc66d52bef19?w=800",
                "https://images.unsplash.com/photo-1544551763-46a013bb70d5?w=800",
            ],
            &["Marine Biologist Guide", "Breakfast", "Life Jackets", "Binoculars", "Hotel Pickup"],
            20,
            4.8,
            178,
            6,
            "Ocean Adventures Lanka",
        ),
        service(
            8,
            "Luxury Sedan with Driver",
            ServiceType::Vehicles,
            80.0,
            "Colombo",
            "Premium sedan with a chauffeur for business trips, airport transfers or city tours. Hourly or daily rates.",
            &["https://images.unsplash.com/photo-1503376780353-7e6692767b70?w=800"],
            &["Professional Driver", "Fuel Included", "Insurance", "WiFi", "Air Conditioning"],
            4,
            4.7,
            94,
            3,
            "Elite Travels",
        ),
    ]
}

pub fn find(services: &[Service], id: u64) -> Option<Service> {
    services.iter().find(|s| s.id == id).cloned()
}

pub fn search(services: &[Service], filters: &SearchFilters) -> Vec<Service> {
    services
        .iter()
        .filter(|s| filters.matches(s))
        .cloned()
        .collect()
}
