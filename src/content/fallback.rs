//! Compiled-in content sets.
//!
//! Shown whenever the store is unconfigured, unreachable, empty, or returns
//! rows that do not decode. The seed commands write these same sets into a
//! fresh base, so a newly created base and a site running without one look
//! the same.
//!
//! Order here is display order; the resolver returns these vectors as is.

use super::{EventRecord, LeadershipRecord, MinistryRecord, MissionRecord, SermonRecord};
use chrono::Weekday;

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

fn person(id: &str, name: &str, position: &str) -> LeadershipRecord {
    LeadershipRecord {
        id: id.to_string(),
        name: name.to_string(),
        position: position.to_string(),
        bio: None,
        email: None,
        phone: None,
    }
}

pub fn leadership() -> Vec<LeadershipRecord> {
    let pastor = LeadershipRecord {
        bio: text(
            "Pastor Doug Reeder has been serving at CFBC since 1989 and became Senior Pastor \
             in 2002. His passion is to lead our church family in knowing God's Word, growing \
             in faith, and reaching the lost with the Gospel of Jesus Christ. A graduate of \
             Liberty University, Pastor Doug brings a strong biblical foundation and a heart \
             for discipleship. He is committed to expository preaching that challenges \
             believers to live out their faith in practical, meaningful ways.",
        ),
        email: text("pastor9919@gmail.com"),
        phone: text("(440) 354-8994"),
        ..person("pastor-1", "Pastor Doug Reeder", "Pastor")
    };
    vec![
        pastor,
        person("deacon-1", "Joe Burke", "Deacon"),
        person("deacon-2", "Jim Carnovale", "Deacon"),
        person("deacon-3", "Gene Hodgson", "Deacon"),
        person("trustee-1", "Dave Babuder", "Trustee"),
        person("trustee-2", "John Carrus", "Trustee"),
        person("trustee-3", "George Dujanovic", "Trustee"),
        person("trustee-4", "Ed Harris", "Trustee"),
        person("trustee-5", "Mike McKenna", "Trustee"),
        person("trustee-6", "Doug Sabattis", "Trustee"),
    ]
}

struct MinistrySeed {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    audience: &'static str,
    meeting_times: &'static str,
    leader_contact: &'static str,
}

const MINISTRIES: [MinistrySeed; 7] = [
    MinistrySeed {
        name: "727 Student Ministry",
        slug: "727-student-ministry",
        description: "To create an environment where high school and middle school students \
            are reached with God's love, helped to develop a real relationship with Him, and \
            led to discover how to best honor God with their lives. Includes Teen Sunday \
            School and Youth Group Bible Study.",
        audience: "Middle School and High School Students",
        meeting_times: "Sunday mornings at 9:30 AM (Teen Sunday School at Ministry House) and \
            Sunday evenings at 5:30 PM (Youth Group Bible Study)",
        leader_contact: "Contact church office: 440-354-8994",
    },
    MinistrySeed {
        name: "Children's Ministry",
        slug: "childrens-ministry",
        description: "Bible-based teaching and discipleship for ages 4 years old through 6th \
            grade, giving children opportunities to know, love, and serve Jesus. Includes \
            Awana Clubs, Sunday School, and Children's Church programs.",
        audience: "Ages 4 years old through 6th grade (Nursery through 6th grade for various \
            programs)",
        meeting_times: "Sunday School: 10:00-11:00 AM, Awana Clubs: Sunday evenings 5:30-7:00 \
            PM (during school year), Children's Church during main service",
        leader_contact: "Church office: 440-354-8994",
    },
    MinistrySeed {
        name: "Adult Bible Fellowship",
        slug: "adult-bible-fellowship",
        description: "Small group program designed to deepen biblical knowledge and spiritual \
            growth for CFBC members and regular attendees. Focuses on spiritual development, \
            mutual support, evangelism, and fellowship.",
        audience: "Adult church members and regular attendees of all ages",
        meeting_times: "Sundays 10:00 AM - 11:00 AM, Men's Bible Study: Thursdays 7:00 PM - \
            8:00 PM (fall program)",
        leader_contact: "Contact through church office or attend meetings",
    },
    MinistrySeed {
        name: "Men's Ministry (CFBC Fraternity)",
        slug: "mens-ministry",
        description: "Designed to help men come together and strengthen each other, teaching \
            authentic manhood through Jesus Christ's example and biblical instruction. \
            Provides an encouraging process for living lives of authentic manhood as modeled \
            by Jesus Christ.",
        audience: "All men of the church, friends and family welcome",
        meeting_times: "Monthly gatherings, Bible Study: Thursdays 7:00-8:00 PM (Fall program)",
        leader_contact: "Contact through church's main contact page",
    },
    MinistrySeed {
        name: "Women's Ministry",
        slug: "womens-ministry",
        description: "Focuses on providing spiritual support, encouragement, and community for \
            women. Includes Women's Bible Study, Secret Sister Program, Bereavement Support, \
            and Shower Ministry for weddings and babies.",
        audience: "Women of all ages",
        meeting_times: "Women's Bible Study: Every Wednesday 10:00 AM-12:00 PM at Fellowship Hall",
        leader_contact: "Bonnie Tillery (Helping Hands), Tracy Carnovale (Showers), Email: \
            info@cfbchurch.net",
    },
    MinistrySeed {
        name: "Music Ministry",
        slug: "music-ministry",
        description: "Blends contemporary worship and traditional songs of the faith to prepare \
            the hearts of the congregation for the leading of the Holy Spirit and receiving \
            the Word of God. Uses various instruments including trumpet, harp, lyre, strings, \
            flute, cymbals, and percussion.",
        audience: "Entire congregation, no age restrictions",
        meeting_times: "Serves during worship services",
        leader_contact: "Contact through church contact page",
    },
    MinistrySeed {
        name: "Helping Hands Food Pantry",
        slug: "helping-hands-food-pantry",
        description: "Provides both physical and spiritual nourishment to those in the \
            community. Distributes bags containing non-perishable food items to community \
            members in need. Individuals may visit once monthly.",
        audience: "Community members in need (all ages)",
        meeting_times: "Open every Thursday from 10:00 AM to 12:00 PM",
        leader_contact: "Church office: 440-354-8994 (call to arrange appointment)",
    },
];

pub fn ministries() -> Vec<MinistryRecord> {
    MINISTRIES
        .iter()
        .enumerate()
        .map(|(i, m)| MinistryRecord {
            id: format!("ministry-{}", i + 1),
            name: m.name.to_string(),
            slug: text(m.slug),
            description: m.description.to_string(),
            audience: text(m.audience),
            meeting_times: text(m.meeting_times),
            leader_contact: text(m.leader_contact),
        })
        .collect()
}

/// Slug overrides for ministries whose generated slug would read badly.
pub fn ministry_slug_override(name: &str) -> Option<&'static str> {
    MINISTRIES
        .iter()
        .find(|m| m.name == name)
        .map(|m| m.slug)
}

struct MissionarySeed {
    name: &'static str,
    location: &'static str,
    country: &'static str,
    ministry: &'static str,
    description: Option<&'static str>,
    website: Option<&'static str>,
}

const fn missionary(
    name: &'static str,
    location: &'static str,
    country: &'static str,
    ministry: &'static str,
) -> MissionarySeed {
    MissionarySeed {
        name,
        location,
        country,
        ministry,
        description: None,
        website: None,
    }
}

// Personal mailing addresses and email are kept out of the compiled set;
// they live only in the base.
const MISSIONARIES: [MissionarySeed; 14] = [
    missionary(
        "Bart & Emily Allen",
        "Madang, Papua New Guinea",
        "Papua New Guinea",
        "Ethnos 360 (NTM - New Tribes Mission)",
    ),
    MissionarySeed {
        description: Some("Based in Ramseur, North Carolina"),
        ..missionary(
            "Jeff & Arlene Berg",
            "Pittsburgh, PA",
            "USA",
            "Jewish Awareness Ministries",
        )
    },
    missionary("Douglas Britton", "Kiev, Ukraine", "Ukraine", "Global Outreach Mission"),
    MissionarySeed {
        description: Some("Based in Richardson, Texas"),
        ..missionary(
            "Steve & Beth Coffey",
            "West Lawn, PA",
            "USA",
            "Christar Ministries, Inc",
        )
    },
    MissionarySeed {
        website: Some("http://awanamidamerica.org/"),
        ..missionary("Ken & Melinda Cogley", "Ohio", "USA", "Awana Missionaries")
    },
    missionary("Tim & Alice Dysert", "Madrid, Spain", "Spain", "Baptist World Mission"),
    missionary(
        "Paul & Elaine Kintner",
        "Winston-Salem, NC",
        "USA",
        "Baptist Mid-Missions",
    ),
    missionary(
        "David & Renee Lyons",
        "Colorado Springs, CO",
        "USA",
        "The Navigators",
    ),
    MissionarySeed {
        website: Some("www.freehope.org"),
        ..missionary(
            "Norma Nulph",
            "Cleveland, OH",
            "USA",
            "Faith Baptist Community Center / Baptist Mid-Missions",
        )
    },
    missionary("Gary & Darla Pettet", "Raleigh, NC", "USA", "e3partners"),
    missionary(
        "Carol Renner",
        "Mayfield Heights, OH",
        "USA",
        "Baptist Messianic Ministries / Baptist Mid-Missions",
    ),
    MissionarySeed {
        website: Some("http://www.abwe.org/"),
        ..missionary(
            "Dr. Jack & Sandy Sorg",
            "Loganville, GA",
            "USA",
            "Association of Baptists for World Evangelism (ABWE)",
        )
    },
    missionary("Joy Spieth", "Manaus, Brazil", "Brazil", "Baptist Mid-Missions"),
    missionary(
        "Michael & Sherri Vanek",
        "Elyria, OH",
        "USA",
        "Faith Baptist Community Center / Baptist Mid-Missions",
    ),
];

pub fn missions() -> Vec<MissionRecord> {
    MISSIONARIES
        .iter()
        .enumerate()
        .map(|(i, m)| MissionRecord {
            id: format!("mission-{}", i + 1),
            missionary_name: m.name.to_string(),
            location: m.location.to_string(),
            country: text(m.country),
            ministry: m.ministry.to_string(),
            description: m.description.map(str::to_string),
            email: None,
            phone: None,
            address: None,
            website: m.website.map(str::to_string),
            image_path: None,
            published: true,
        })
        .collect()
}

/// No sermon archive ships with the binary; the sermons page says so.
pub fn sermons() -> Vec<SermonRecord> {
    Vec::new()
}

/// One slot of the regular weekly schedule.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyEvent {
    pub name: &'static str,
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
    pub ministry: &'static str,
    pub description: &'static str,
    /// Pattern written to the store: "Weekly" or "By appointment".
    pub pattern: &'static str,
    /// Human schedule shown when no concrete date is known.
    pub label: &'static str,
}

const PRAYER: &str = "Join us in praying for families and friends in need, for our \
    government, our community, our church";

pub const WEEKLY_SCHEDULE: [WeeklyEvent; 8] = [
    WeeklyEvent {
        name: "Sunday School",
        weekday: Weekday::Sun,
        hour: 10,
        minute: 0,
        ministry: "All",
        description: "All ages - nursery through adults",
        pattern: "Weekly",
        label: "Sundays at 10:00 AM",
    },
    WeeklyEvent {
        name: "Morning Worship",
        weekday: Weekday::Sun,
        hour: 11,
        minute: 0,
        ministry: "All",
        description: "Our main worship service",
        pattern: "Weekly",
        label: "Sundays at 11:00 AM",
    },
    WeeklyEvent {
        name: "AWANA, 727 Ministry, Adult Bible Study",
        weekday: Weekday::Sun,
        hour: 17,
        minute: 30,
        ministry: "All",
        description: "Evening programs for all ages",
        pattern: "Weekly",
        label: "Sundays at 5:30 PM",
    },
    WeeklyEvent {
        name: "Ladies Bible Study",
        weekday: Weekday::Wed,
        hour: 10,
        minute: 0,
        ministry: "Women",
        description: "Fellowship Hall - Open to all women",
        pattern: "Weekly",
        label: "Wednesdays at 10:00 AM",
    },
    WeeklyEvent {
        name: "Prayer Meeting",
        weekday: Weekday::Wed,
        hour: 18,
        minute: 30,
        ministry: "All",
        description: PRAYER,
        pattern: "Weekly",
        label: "Wednesdays at 6:30 PM",
    },
    WeeklyEvent {
        name: "Prayer Meeting",
        weekday: Weekday::Thu,
        hour: 14,
        minute: 0,
        ministry: "All",
        description: PRAYER,
        pattern: "Weekly",
        label: "Thursdays at 2:00 PM",
    },
    WeeklyEvent {
        name: "Helping Hands Food Pantry",
        weekday: Weekday::Thu,
        hour: 10,
        minute: 0,
        ministry: "All",
        description: "Call the church office to schedule a pickup time",
        pattern: "By appointment",
        label: "Thursdays, by appointment",
    },
    WeeklyEvent {
        name: "Men's Bible Study",
        weekday: Weekday::Thu,
        hour: 19,
        minute: 0,
        ministry: "Men",
        description: "For all men to develop in faith",
        pattern: "Weekly",
        label: "Thursdays at 7:00 PM",
    },
];

impl WeeklyEvent {
    /// As an undated recurring event carrying its schedule label.
    pub fn to_event(&self, id: String) -> EventRecord {
        EventRecord {
            id,
            name: self.name.to_string(),
            date_time: None,
            ministry: text(self.ministry),
            description: text(self.description),
            location: None,
            contact_person: None,
            recurring: true,
            recurrence_pattern: text(self.label),
        }
    }
}

pub fn events() -> Vec<EventRecord> {
    WEEKLY_SCHEDULE
        .iter()
        .enumerate()
        .map(|(i, e)| e.to_event(format!("event-{}", i + 1)))
        .collect()
}
