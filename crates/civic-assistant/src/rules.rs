//! Canned answers used when the completion delegate is unavailable.
//!
//! Rules are evaluated in declaration order against the lowercased message and
//! the first hit wins, so overlapping keywords are settled purely by position.

use aho_corasick::AhoCorasick;
use regex::Regex;

pub const FALLBACK_REPLY: &str = "I'm not sure I understood that. Here are some things I can help with:\n\
- Type \"ticket #ID\" to check a complaint status\n\
- Ask about civic coins, geofencing or how to file a report\n\
- Type \"help\" to see everything I can do\n\n\
Try rephrasing if I missed what you meant.";

const GREETING_REPLY: &str = "Hello! I'm CivicBot, your civic assistant.\n\n\
I can help you with:\n\
- Checking your complaint or ticket status\n\
- Understanding how the platform works\n\
- Civic coins and rewards\n\
- Reporting an issue\n\n\
Ask me anything, or say \"ticket #12\" to check a specific complaint.";

const OVERVIEW_REPLY: &str = "Here's how the platform works:\n\n\
1. You report the problem: take a photo of the issue and submit it from Add Report. Your location is saved automatically.\n\
2. An administrator reviews the report and assigns it to a staff member.\n\
3. Staff fix the issue on site and upload a photo as proof.\n\
4. You visit the location and verify. The app checks that you are physically nearby (geofencing) before you can confirm the fix.\n\
5. You earn civic coins for verifying the repair.\n\n\
Ask me \"how to report\", \"check ticket status\" or \"what are civic coins\" to learn more.";

const FILE_REPORT_REPLY: &str = "How to file a complaint:\n\n\
1. Open Add Report from the sidebar.\n\
2. Enter a title and choose a category (pothole, garbage, lighting and so on).\n\
3. Upload a geo-tagged photo of the issue.\n\
4. Your GPS location is captured automatically.\n\
5. Submit. Your complaint is logged immediately.\n\n\
You can track it any time from My Reports.";

const STATUS_REPLY: &str = "To check a complaint, ask something like \"What is the status of ticket #12?\"\n\n\
What each status means:\n\
- Open: received, waiting for assignment.\n\
- In Progress: staff are working on it.\n\
- Pending Verification: repair done, please verify on site.\n\
- Resolved: verified and closed. Thank you!";

const GEOFENCING_REPLY: &str = "How on-site verification works:\n\n\
When staff finish a repair your ticket waits for your verification. To close it:\n\
1. Visit the repaired location.\n\
2. Open the app at that spot.\n\
3. Tap Verify Repair. The app compares your GPS position with the complaint location.\n\
4. Once confirmed the ticket is closed and you earn civic coins.\n\n\
This makes sure repairs are really done before tickets close.";

const COINS_REPLY: &str = "Civic coins reward good citizenship.\n\n\
You earn coins when you verify a completed repair on site. \
Redeem them from the Rewards page, and check your balance in the top bar.";

const OPEN_STATUS_REPLY: &str = "Open means your complaint has been received but not yet assigned to a staff member.\n\n\
No action is needed from you right now. You'll be notified once it's assigned.";

const PROGRESS_STATUS_REPLY: &str = "In Progress means staff are actively working on your complaint.\n\n\
Once the work is complete the ticket waits for you to visit the location and verify the repair, which closes it and earns you civic coins.";

const RESOLVED_STATUS_REPLY: &str = "Resolved means your complaint has been fully addressed and the repair was verified on site.\n\n\
Thank you for helping improve your community!";

const UPVOTE_REPLY: &str = "You can upvote any public complaint to show it's a shared problem in your community. \
More upvotes help authorities prioritise. Each citizen can upvote a report once.";

const AGENT_REPLY: &str = "Once your complaint is reviewed it is assigned to a staff member. \
You can see the assigned agent's name on the Report Details page.\n\n\
Not assigned yet? Your report is still Open and will be picked up soon.";

const NOTIFICATIONS_REPLY: &str = "You'll get a notification when:\n\
- your complaint is submitted\n\
- it is assigned to a staff member\n\
- its status changes\n\
- you earn civic coins\n\n\
Check the bell icon in the top bar for all your notifications.";

const HELP_REPLY: &str = "Here's what I can help with:\n\
- Ticket status: say \"ticket #12\" to check a complaint\n\
- How to file a complaint\n\
- What the statuses mean (Open, In Progress and so on)\n\
- On-site (geofencing) verification\n\
- Civic coins and rewards\n\
- Upvotes, assigned agents and notifications\n\n\
Just type your question naturally.";

const THANKS_REPLY: &str = "You're welcome! If you have more questions about your complaints, feel free to ask any time.";

enum Matcher {
    AnyKeyword(AhoCorasick),
    Pattern(Regex),
    Exact(&'static [&'static str]),
}

impl Matcher {
    fn keywords(keywords: &[&str]) -> Option<Self> {
        match AhoCorasick::new(keywords) {
            Ok(automaton) => Some(Self::AnyKeyword(automaton)),
            Err(error) => {
                tracing::warn!(%error, "skipping keyword matcher");
                None
            }
        }
    }

    fn pattern(pattern: &str) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(regex) => Some(Self::Pattern(regex)),
            Err(error) => {
                tracing::warn!(%error, pattern, "skipping pattern matcher");
                None
            }
        }
    }

    fn is_match(&self, lowered: &str) -> bool {
        match self {
            Self::AnyKeyword(automaton) => automaton.is_match(lowered),
            Self::Pattern(regex) => regex.is_match(lowered),
            Self::Exact(values) => values.iter().any(|value| *value == lowered.trim()),
        }
    }
}

struct Rule {
    name: &'static str,
    matchers: Vec<Matcher>,
    reply: &'static str,
}

impl Rule {
    fn new(name: &'static str, matchers: Vec<Option<Matcher>>, reply: &'static str) -> Self {
        Self {
            name,
            matchers: matchers.into_iter().flatten().collect(),
            reply,
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(lowered))
    }
}

/// Ordered keyword and pattern table.
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        let rules = vec![
            Rule::new(
                "greeting",
                vec![Matcher::pattern(r"\b(hi|hello|hey|hola|vanakam)\b")],
                GREETING_REPLY,
            ),
            Rule::new(
                "overview",
                vec![
                    Matcher::keywords(&[
                        "how to use",
                        "how does this work",
                        "how does it work",
                        "how it works",
                        "how this works",
                        "what is this platform",
                        "guide me",
                        "get started",
                        "how to start",
                        "what can i do",
                        "explain",
                        "tell me about",
                        "overview",
                        "about this",
                        "what does this",
                        "how the website",
                        "how the app",
                        "how the platform",
                        "how does the website",
                        "generally",
                        "in simple",
                        "brief",
                        "steps",
                        "workflow",
                        "process",
                    ]),
                    Some(Matcher::Exact(&["guide"])),
                ],
                OVERVIEW_REPLY,
            ),
            Rule::new(
                "file_report",
                vec![
                    Matcher::pattern(
                        r"(file|submit|raise|create|report|add).*(complaint|report|issue|problem|ticket)",
                    ),
                    Matcher::keywords(&["how to report", "how do i report"]),
                ],
                FILE_REPORT_REPLY,
            ),
            Rule::new(
                "ticket_status",
                vec![Matcher::pattern(
                    r"(status|update|progress|check).*(ticket|complaint|report|issue)|(ticket|complaint|report|issue).*(status|update|progress)",
                )],
                STATUS_REPLY,
            ),
            Rule::new(
                "geofencing",
                vec![Matcher::keywords(&[
                    "geofenc",
                    "geo fence",
                    "physical verif",
                    "verify location",
                    "how to verify",
                    "verify repair",
                ])],
                GEOFENCING_REPLY,
            ),
            Rule::new(
                "civic_coins",
                vec![Matcher::keywords(&[
                    "civic coin", "coins", "earn", "reward", "points", "redeem",
                ])],
                COINS_REPLY,
            ),
            Rule::new(
                "open_status",
                vec![Matcher::keywords(&["red status", "open status", "what is open"])],
                OPEN_STATUS_REPLY,
            ),
            Rule::new(
                "progress_status",
                vec![Matcher::keywords(&[
                    "orange status",
                    "in progress",
                    "progress status",
                ])],
                PROGRESS_STATUS_REPLY,
            ),
            Rule::new(
                "resolved_status",
                vec![Matcher::keywords(&[
                    "green status",
                    "resolved",
                    "closed status",
                ])],
                RESOLVED_STATUS_REPLY,
            ),
            Rule::new(
                "upvote",
                vec![Matcher::keywords(&["upvote", "vote", "support report"])],
                UPVOTE_REPLY,
            ),
            Rule::new(
                "assigned_agent",
                vec![Matcher::keywords(&[
                    "agent",
                    "staff",
                    "assigned",
                    "who is handling",
                ])],
                AGENT_REPLY,
            ),
            Rule::new(
                "notifications",
                vec![Matcher::keywords(&["notification", "alert", "update me"])],
                NOTIFICATIONS_REPLY,
            ),
            Rule::new(
                "help",
                vec![
                    Matcher::keywords(&["help", "what can you", "what do you"]),
                    Some(Matcher::Exact(&["?"])),
                ],
                HELP_REPLY,
            ),
            Rule::new(
                "thanks",
                vec![
                    Matcher::keywords(&["thank", "great", "awesome", "perfect", "nice"]),
                    // Short forms need word boundaries or "city" would read as thanks.
                    Matcher::pattern(r"\b(thx|ty)\b"),
                ],
                THANKS_REPLY,
            ),
        ];
        Self { rules }
    }

    /// Name of the first rule matching `message`, if any.
    pub fn matched_rule(&self, message: &str) -> Option<&'static str> {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.name)
    }

    pub fn reply(&self, message: &str) -> &'static str {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(FALLBACK_REPLY, |rule| rule.reply)
    }
}
