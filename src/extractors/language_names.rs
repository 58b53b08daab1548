//! ISO 639-1 language names
//!
//! English name first, then native names and common aliases. Lower-case.

pub(super) const ISO_639_1: &[(&str, &[&str])] = &[
    ("aa", &["afar", "qafaraf"]),
    ("ab", &["abkhazian", "abkhaz", "аҧсуа"]),
    ("ae", &["avestan"]),
    ("af", &["afrikaans"]),
    ("ak", &["akan"]),
    ("am", &["amharic", "አማርኛ"]),
    ("an", &["aragonese", "aragonés"]),
    ("ar", &["arabic", "العربية"]),
    ("as", &["assamese", "অসমীয়া"]),
    ("av", &["avaric", "avar"]),
    ("ay", &["aymara", "aymar aru"]),
    ("az", &["azerbaijani", "azeri", "azərbaycan"]),
    ("ba", &["bashkir", "башҡорт"]),
    ("be", &["belarusian", "беларуская"]),
    ("bg", &["bulgarian", "български"]),
    ("bi", &["bislama"]),
    ("bm", &["bambara", "bamanankan"]),
    ("bn", &["bengali", "bangla", "বাংলা"]),
    ("bo", &["tibetan"]),
    ("br", &["breton", "brezhoneg"]),
    ("bs", &["bosnian", "bosanski"]),
    ("ca", &["catalan", "català", "valencian"]),
    ("ce", &["chechen", "нохчийн"]),
    ("ch", &["chamorro", "chamoru"]),
    ("co", &["corsican", "corsu"]),
    ("cr", &["cree"]),
    ("cs", &["czech", "čeština"]),
    ("cu", &["church slavic", "church slavonic", "old church slavonic"]),
    ("cv", &["chuvash", "чӑвашла"]),
    ("cy", &["welsh", "cymraeg"]),
    ("da", &["danish", "dansk"]),
    ("de", &["german", "deutsch"]),
    ("dv", &["dhivehi", "divehi", "maldivian"]),
    ("dz", &["dzongkha"]),
    ("ee", &["ewe", "eʋegbe"]),
    ("el", &["greek", "ελληνικά"]),
    ("en", &["english"]),
    ("eo", &["esperanto"]),
    ("es", &["spanish", "español", "castilian"]),
    ("et", &["estonian", "eesti"]),
    ("eu", &["basque", "euskara"]),
    ("fa", &["persian", "farsi", "فارسی"]),
    ("ff", &["fulah", "fula", "fulfulde", "pulaar"]),
    ("fi", &["finnish", "suomi"]),
    ("fj", &["fijian"]),
    ("fo", &["faroese", "føroyskt"]),
    ("fr", &["french", "français"]),
    ("fy", &["western frisian", "frisian", "frysk"]),
    ("ga", &["irish", "gaeilge"]),
    ("gd", &["scottish gaelic", "gaelic", "gàidhlig"]),
    ("gl", &["galician", "galego"]),
    ("gn", &["guarani", "avañe'ẽ"]),
    ("gu", &["gujarati", "ગુજરાતી"]),
    ("gv", &["manx", "gaelg"]),
    ("ha", &["hausa"]),
    ("he", &["hebrew", "עברית"]),
    ("hi", &["hindi", "हिन्दी"]),
    ("ho", &["hiri motu"]),
    ("hr", &["croatian", "hrvatski"]),
    ("ht", &["haitian", "haitian creole", "kreyòl ayisyen"]),
    ("hu", &["hungarian", "magyar"]),
    ("hy", &["armenian", "հայերեն"]),
    ("hz", &["herero", "otjiherero"]),
    ("ia", &["interlingua"]),
    ("id", &["indonesian", "bahasa indonesia"]),
    ("ie", &["interlingue", "occidental"]),
    ("ig", &["igbo"]),
    ("ii", &["sichuan yi", "nuosu"]),
    ("ik", &["inupiaq", "iñupiaq"]),
    ("io", &["ido"]),
    ("is", &["icelandic", "íslenska"]),
    ("it", &["italian", "italiano"]),
    ("iu", &["inuktitut", "ᐃᓄᒃᑎᑐᑦ"]),
    ("ja", &["japanese", "日本語"]),
    ("jv", &["javanese", "basa jawa"]),
    ("ka", &["georgian", "ქართული"]),
    ("kg", &["kongo", "kikongo"]),
    ("ki", &["kikuyu", "gikuyu"]),
    ("kj", &["kuanyama", "kwanyama"]),
    ("kk", &["kazakh", "қазақ тілі"]),
    ("kl", &["kalaallisut", "greenlandic"]),
    ("km", &["khmer", "ខ្មែរ"]),
    ("kn", &["kannada", "ಕನ್ನಡ"]),
    ("ko", &["korean", "한국어"]),
    ("kr", &["kanuri"]),
    ("ks", &["kashmiri", "कॉशुर"]),
    ("ku", &["kurdish", "kurdî"]),
    ("kv", &["komi", "коми"]),
    ("kw", &["cornish", "kernewek"]),
    ("ky", &["kirghiz", "kyrgyz", "кыргызча"]),
    ("la", &["latin"]),
    ("lb", &["luxembourgish", "lëtzebuergesch"]),
    ("lg", &["ganda", "luganda"]),
    ("li", &["limburgish", "limburgan", "limburgs"]),
    ("ln", &["lingala"]),
    ("lo", &["lao", "ລາວ"]),
    ("lt", &["lithuanian", "lietuvių"]),
    ("lu", &["luba-katanga", "kiluba"]),
    ("lv", &["latvian", "latviešu"]),
    ("mg", &["malagasy"]),
    ("mh", &["marshallese"]),
    ("mi", &["maori", "māori", "te reo māori"]),
    ("mk", &["macedonian", "македонски"]),
    ("ml", &["malayalam", "മലയാളം"]),
    ("mn", &["mongolian", "монгол"]),
    ("mr", &["marathi", "मराठी"]),
    ("ms", &["malay", "bahasa melayu"]),
    ("mt", &["maltese", "malti"]),
    ("my", &["burmese", "မြန်မာ"]),
    ("na", &["nauru", "nauruan"]),
    ("nb", &["norwegian bokmål", "bokmål", "norsk bokmål"]),
    ("nd", &["north ndebele"]),
    ("ne", &["nepali", "नेपाली"]),
    ("ng", &["ndonga", "owambo"]),
    ("nl", &["dutch", "flemish", "nederlands"]),
    ("nn", &["norwegian nynorsk", "nynorsk"]),
    ("no", &["norwegian", "norsk"]),
    ("nr", &["south ndebele"]),
    ("nv", &["navajo", "navaho", "diné bizaad"]),
    ("ny", &["nyanja", "chichewa", "chewa"]),
    ("oc", &["occitan"]),
    ("oj", &["ojibwa", "ojibwe"]),
    ("om", &["oromo", "afaan oromoo"]),
    ("or", &["oriya", "odia", "ଓଡ଼ିଆ"]),
    ("os", &["ossetian", "ossetic", "ирон"]),
    ("pa", &["punjabi", "panjabi", "ਪੰਜਾਬੀ"]),
    ("pi", &["pali"]),
    ("pl", &["polish", "polski"]),
    ("ps", &["pashto", "pushto", "پښتو"]),
    ("pt", &["portuguese", "português"]),
    ("qu", &["quechua", "runa simi"]),
    ("rm", &["romansh", "rumantsch"]),
    ("rn", &["rundi", "kirundi"]),
    ("ro", &["romanian", "moldavian", "română"]),
    ("ru", &["russian", "русский"]),
    ("rw", &["kinyarwanda"]),
    ("sa", &["sanskrit", "संस्कृतम्"]),
    ("sc", &["sardinian", "sardu"]),
    ("sd", &["sindhi", "سنڌي"]),
    ("se", &["northern sami", "davvisámegiella"]),
    ("sg", &["sango", "sängö"]),
    ("si", &["sinhala", "sinhalese", "සිංහල"]),
    ("sk", &["slovak", "slovenčina"]),
    ("sl", &["slovenian", "slovene", "slovenščina"]),
    ("sm", &["samoan", "gagana samoa"]),
    ("sn", &["shona", "chishona"]),
    ("so", &["somali", "soomaali"]),
    ("sq", &["albanian", "shqip"]),
    ("sr", &["serbian", "српски"]),
    ("ss", &["swati", "siswati"]),
    ("st", &["southern sotho", "sesotho"]),
    ("su", &["sundanese", "basa sunda"]),
    ("sv", &["swedish", "svenska"]),
    ("sw", &["swahili", "kiswahili"]),
    ("ta", &["tamil", "தமிழ்"]),
    ("te", &["telugu", "తెలుగు"]),
    ("tg", &["tajik", "тоҷикӣ"]),
    ("th", &["thai", "ไทย"]),
    ("ti", &["tigrinya", "ትግርኛ"]),
    ("tk", &["turkmen", "türkmen"]),
    ("tl", &["tagalog", "filipino"]),
    ("tn", &["tswana", "setswana"]),
    ("to", &["tonga", "tongan"]),
    ("tr", &["turkish", "türkçe"]),
    ("ts", &["tsonga", "xitsonga"]),
    ("tt", &["tatar", "татар"]),
    ("tw", &["twi"]),
    ("ty", &["tahitian", "reo tahiti"]),
    ("ug", &["uighur", "uyghur", "ئۇيغۇرچە"]),
    ("uk", &["ukrainian", "українська"]),
    ("ur", &["urdu", "اردو"]),
    ("uz", &["uzbek", "oʻzbek"]),
    ("ve", &["venda", "tshivenḓa"]),
    ("vi", &["vietnamese", "tiếng việt"]),
    ("vo", &["volapük"]),
    ("wa", &["walloon", "walon"]),
    ("wo", &["wolof"]),
    ("xh", &["xhosa", "isixhosa"]),
    ("yi", &["yiddish", "ייִדיש"]),
    ("yo", &["yoruba", "yorùbá"]),
    ("za", &["zhuang"]),
    ("zh", &["chinese", "mandarin", "中文"]),
    ("zu", &["zulu", "isizulu"]),
];
