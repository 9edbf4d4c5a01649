// Prompts sent to the generative API. One per content slot that can be generated.
// The recipient and the occasion are part of the card, not configuration.

pub const COMPLIMENT_PROMPT: &str = "Generate a short, unique, and heartfelt compliment for a dear \
    friend named Sriya. Avoid generic phrases. Focus on a specific, admirable quality, like her \
    kindness, strength, or smile. Make it sound personal and sincere. One sentence.";

pub const IMAGE_PROMPT: &str = "A magical and elegant birthday card for a 25th birthday. The scene \
    features a beautiful cake with glowing candles, surrounded by sparkling lights and soft, \
    ethereal flower petals in shades of pink and gold. The style should be dreamy and artistic. \
    The card should have the following text beautifully integrated: \"For you maa 💟 This cake \
    may fade, but the love and prayers behind it stay forever. Happy 25th, my blessing, my Devi, \
    Sriya Reddie.\"";

/// The reply must keep the two-line header so the layout engine can split it off.
pub const POEM_PROMPT: &str = "Write a beautiful and heartfelt acrostic poem for the name \
    \"Sriya\". The poem should celebrate her turning 25. Start the response with a title and a \
    short intro line, then the poem. For example: \"For Sriya, on her 25th Birthday\nA poem to \
    celebrate you.\"";

pub const FORECAST_PROMPT: &str = "Create a mystical and positive \"forecast\" for Sriya's 25th \
    year of life. Make it sound like a beautiful, uplifting prophecy or horoscope. Focus on themes \
    of growth, joy, and adventure. Keep it to one paragraph.";

pub const HISTORY_PROMPT: &str = "Write a short, warm \"on this day, 25 years ago\" note for \
    Sriya's birthday, celebrating the day she was born and the light she has brought to the world \
    since. Keep it to six short lines.";
