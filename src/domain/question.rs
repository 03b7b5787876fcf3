/// The fixed question set: 36 prompts ordered from light to deep.
///
/// Records are static data. Per-draw annotations (who asks, how to ask)
/// live on `DrawnQuestion`, never on the record itself.

use super::actor::PlayerId;

#[derive(Debug, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: u8,
    pub category: &'static str,
    pub text: &'static str,
    pub instructions: &'static str,
}

/// A record as handed to the table: stamped with its asker at draw time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawnQuestion {
    pub record: &'static QuestionRecord,
    pub asker: PlayerId,
    pub asking_instructions: String,
}

impl DrawnQuestion {
    pub fn new(record: &'static QuestionRecord, asker: PlayerId) -> Self {
        DrawnQuestion {
            record,
            asker,
            asking_instructions: asking_instructions(asker),
        }
    }

    pub fn id(&self) -> u8 {
        self.record.id
    }
}

pub fn asking_instructions(asker: PlayerId) -> String {
    format!(
        "{} Player: Please read this question aloud to your partner and share your answer first.",
        asker.color().label()
    )
}

pub const QUESTION_COUNT: usize = 36;

pub static QUESTIONS: [QuestionRecord; QUESTION_COUNT] = [
    QuestionRecord {
        id: 1,
        category: "Getting to Know You",
        text: "Given the choice of anyone in the world, whom would you want as a dinner guest?",
        instructions: "Take turns sharing your answers. Don't rush - really think about your choice and explain why.",
    },
    QuestionRecord {
        id: 2,
        category: "Getting to Know You",
        text: "Would you like to be famous? In what way?",
        instructions: "Be honest about your relationship with fame and recognition.",
    },
    QuestionRecord {
        id: 3,
        category: "Getting to Know You",
        text: "Before making a telephone call, do you ever rehearse what you are going to say? Why?",
        instructions: "Share your communication habits and any anxieties you might have.",
    },
    QuestionRecord {
        id: 4,
        category: "Getting to Know You",
        text: "What would constitute a \"perfect\" day for you?",
        instructions: "Describe your ideal day from start to finish. What makes it perfect?",
    },
    QuestionRecord {
        id: 5,
        category: "Getting to Know You",
        text: "When did you last sing to yourself? To someone else?",
        instructions: "Share memories of singing and how music makes you feel.",
    },
    QuestionRecord {
        id: 6,
        category: "Imagination",
        text: "If you were able to live to the age of 90 and retain either the mind or body of a 30-year-old for the last 60 years of your life, which would you want?",
        instructions: "Think about what you value more: mental or physical capabilities.",
    },
    QuestionRecord {
        id: 7,
        category: "Self-Reflection",
        text: "Do you have a secret hunch about how you will die?",
        instructions: "This might seem dark, but it reveals how you think about life and mortality.",
    },
    QuestionRecord {
        id: 8,
        category: "Getting to Know You",
        text: "Name three things you and your partner appear to have in common.",
        instructions: "Look for commonalities you've discovered during your time together.",
    },
    QuestionRecord {
        id: 9,
        category: "Self-Reflection",
        text: "For what in your life do you feel most grateful?",
        instructions: "Share what brings you the deepest sense of gratitude.",
    },
    QuestionRecord {
        id: 10,
        category: "Childhood",
        text: "If you could change anything about the way you were raised, what would it be?",
        instructions: "Reflect on your upbringing and what you might do differently.",
    },
    QuestionRecord {
        id: 11,
        category: "Self-Reflection",
        text: "Take four minutes and tell your partner your life story in as much detail as possible.",
        instructions: "Take turns. Set a timer for 4 minutes each. This is about the big picture of your life.",
    },
    QuestionRecord {
        id: 12,
        category: "Self-Improvement",
        text: "If you could wake up tomorrow having gained any one quality or ability, what would it be?",
        instructions: "Think about what you wish you could improve about yourself.",
    },
    QuestionRecord {
        id: 13,
        category: "Imagination",
        text: "If a crystal ball could tell you the truth about yourself, your life, the future or anything else, what would you want to know?",
        instructions: "What mysteries about life or yourself are you most curious about?",
    },
    QuestionRecord {
        id: 14,
        category: "Dreams",
        text: "Is there something that you've dreamed of doing for a long time? Why haven't you done it?",
        instructions: "Share your long-held dreams and what's been holding you back.",
    },
    QuestionRecord {
        id: 15,
        category: "Self-Reflection",
        text: "What is the greatest accomplishment of your life?",
        instructions: "Share what you're most proud of achieving.",
    },
    QuestionRecord {
        id: 16,
        category: "Relationships",
        text: "What do you value most in a friendship?",
        instructions: "Think about what qualities matter most to you in close relationships.",
    },
    QuestionRecord {
        id: 17,
        category: "Memory",
        text: "What is your most treasured memory?",
        instructions: "Share a memory that brings you joy whenever you think of it.",
    },
    QuestionRecord {
        id: 18,
        category: "Memory",
        text: "What is your most terrible memory?",
        instructions: "Only share what you're comfortable with. This is about being vulnerable.",
    },
    QuestionRecord {
        id: 19,
        category: "Future",
        text: "If you knew that in one year you would die suddenly, would you change anything about the way you are now living? Why?",
        instructions: "Consider what really matters to you and how you spend your time.",
    },
    QuestionRecord {
        id: 20,
        category: "Relationships",
        text: "What does friendship mean to you?",
        instructions: "Define what friendship means in your own words.",
    },
    QuestionRecord {
        id: 21,
        category: "Family",
        text: "What roles do love and affection play in your life?",
        instructions: "Reflect on how you experience and express love.",
    },
    QuestionRecord {
        id: 22,
        category: "Getting to Know You",
        text: "Alternate sharing something you consider a positive characteristic of your partner. Share a total of five items.",
        instructions: "Take turns saying positive things about each other. 5 items total, so one person will go 3 times.",
    },
    QuestionRecord {
        id: 23,
        category: "Family",
        text: "How close and warm is your family? Do you feel your childhood was happier than most other people's?",
        instructions: "Compare your family experience to what you imagine others had.",
    },
    QuestionRecord {
        id: 24,
        category: "Family",
        text: "How do you feel about your relationship with your mother?",
        instructions: "Share honestly about this important relationship.",
    },
    QuestionRecord {
        id: 25,
        category: "Playful",
        text: "Make three true \"we\" statements each. For instance, \"We are both in this room feeling...\"",
        instructions: "Create statements that apply to both of you right now.",
    },
    QuestionRecord {
        id: 26,
        category: "Getting to Know You",
        text: "Complete this sentence: \"I wish I had someone with whom I could share...\"",
        instructions: "Think about what you long to share with someone special.",
    },
    QuestionRecord {
        id: 27,
        category: "Vulnerability",
        text: "If you were going to become a close friend with your partner, please share what would be important for him or her to know.",
        instructions: "Share something important about yourself that close friends should know.",
    },
    QuestionRecord {
        id: 28,
        category: "Getting to Know You",
        text: "Tell your partner what you like about them; be very honest this time, saying things that you might not say to someone you've just met.",
        instructions: "Be more honest and specific than you might normally be.",
    },
    QuestionRecord {
        id: 29,
        category: "Vulnerability",
        text: "Share with your partner an embarrassing moment in your life.",
        instructions: "Choose something you can laugh about now, even if it was embarrassing then.",
    },
    QuestionRecord {
        id: 30,
        category: "Vulnerability",
        text: "When did you last cry in front of another person? By yourself?",
        instructions: "Share about times when you've been emotionally vulnerable.",
    },
    QuestionRecord {
        id: 31,
        category: "Getting to Know You",
        text: "Tell your partner something that you like about them already.",
        instructions: "Share what you've noticed and appreciated about them so far.",
    },
    QuestionRecord {
        id: 32,
        category: "Serious",
        text: "What, if anything, is too serious to be joked about?",
        instructions: "Discuss what topics or experiences you feel are off-limits for humor.",
    },
    QuestionRecord {
        id: 33,
        category: "Future",
        text: "If you were to die this evening with no opportunity to communicate with anyone, what would you most regret not having told someone? Why haven't you told them yet?",
        instructions: "Think about important things left unsaid in your life.",
    },
    QuestionRecord {
        id: 34,
        category: "Serious",
        text: "Your house, containing everything you own, catches fire. After saving your loved ones and pets, you have time to safely make a final dash to save any one item. What would it be? Why?",
        instructions: "Consider what material possession means the most to you.",
    },
    QuestionRecord {
        id: 35,
        category: "Family",
        text: "Of all the people in your family, whose death would you find most disturbing? Why?",
        instructions: "This reveals your closest family bonds and fears.",
    },
    QuestionRecord {
        id: 36,
        category: "Vulnerability",
        text: "Share a personal problem and ask your partner's advice on how he or she might handle it. Also, ask your partner to reflect back to you how you seem to be feeling about the problem you have chosen.",
        instructions: "This requires both vulnerability and empathy from both partners.",
    },
];
