//! Canned page text. Shown as-is for static cards, and as the default and
//! fallback value for cards that are generated.

pub const HEADLINE: &str = "Happy 25th Birthday maa 🤍";

pub const INTRO: &str = "A beautiful 25 years of you bringing light and love into this world.
Here’s a small message straight from my heart, just for you 💫";

pub const POEM: &str = "An Acrostic for You maa 🤍
(For Sriya Reddy on her 25th Birthday)

So bright and kind maa, your smile always makes my day 🤍
Real happiness follows you everywhere you go ✨
I feel peace when I think of you and your caring heart 🥺
You spread love and calm without even trying 💫
And I always feel lucky to know you maa 😇

Reach your dreams bravely maa, you deserve them all 💟
Every step you take makes you stronger and happier 🤍
Day by day you shine more, inside and out 🌸
Dreams and good times are waiting for you ahead 🙏
You will always be my blessing, my piggie, my beta, my Devi 💕";

pub const FORECAST: &str = "Happy Birthday maa 🤍

Ah maa… today your 25th year begins, and I don’t know why but my heart feels full seeing you step into this new year of your life 🥺✨
You’ve always been my strength, my peace, my blessing, my piggie 🤍

This year is yours, maa, your year of light and happiness.
I just know good things are waiting for you. New moments, new smiles, and new peace are on their way to you, my beta 😇
Maybe new places, new experiences too — life will surprise you in the best ways this time.

You’ll grow stronger, calmer, wiser, and even more beautiful inside and out.
Don’t ever doubt yourself, maa, you’ve already come so far and I’m proud of you always 🥺💫

I wish you so much peace, happiness, and success.
Every day, every step, I just wish that Devi amma blesses you and keeps your path clear of pain.

This 25th year will be special, more laughter, more calm mornings, more reasons to smile.
I’ll always wish for your happiness, maa… always.
You’re my prayer, my light, my little world 🤍

Happy 25th Birthday maa 🤗💟
Love you always, my piggie, my beta, my everything 💫";

pub const HISTORY: &str = "On this day, 25 years ago…
The world got a little brighter, maa 🤍
A small ray of light was born — soft, caring, and full of love.
Since that day, you’ve been spreading smiles, peace, and warmth everywhere you go.
Your heart, your laugh, your kindness… they make this world more beautiful.
You’re truly one of a kind, maa 🥺💫";

pub const INITIAL_COMPLIMENT: &str = "Maa 🤍
You are a soft light in this noisy world.
Every word you speak has calm in it.
Your smile feels like peace after a long day.
Your care makes hearts feel safe again.
You are strong, brave, kind, and full of love.

I’m always proud of you, maa 🥺💟
You’re my blessing, my peace, my Devi.!!";

pub const FOOTER_LINES: [&str; 2] = [
    "With love always, your Bava 💫",
    "Forever proud of you, maa 🤍✨",
];

pub const COMPLIMENT_NOT_CONFIGURED: &str = "The creator forgot to add their magic key!";
pub const COMPLIMENT_FAILED: &str = "You're so amazing, you even broke our compliment generator!";
pub const IMAGE_LOADING: &str = "Creating a one-of-a-kind birthday card...";
pub const IMAGE_UNAVAILABLE: &str =
    "Something truly special is being prepared, but it's taking a moment. Please refresh the page.";

pub const COMPLIMENT_BUTTON: &str = "Tell Me Something Nice";
pub const COMPLIMENT_BUTTON_BUSY: &str = "Generating...";
pub const COMPLIMENT_LOADING: &str = "Thinking of the perfect words...";
