use crate::models::Language;

/// Parallel English/Indonesian texts for a message id. Returning `None` for
/// an unknown id lets `render` fall back to the raw key, which keeps a typo
/// visible instead of crashing a conversation.
fn catalog(key: &str) -> Option<(&'static str, &'static str)> {
    let pair = match key {
        "choose_language" => (
            "Welcome to Guestdesk!\nPlease choose a language / Silakan pilih bahasa:\n1. English\n2. Bahasa Indonesia",
            "Welcome to Guestdesk!\nPlease choose a language / Silakan pilih bahasa:\n1. English\n2. Bahasa Indonesia",
        ),
        "greeting" => (
            "Hello! I can help you check or modify your reservation.",
            "Halo! Saya dapat membantu Anda memeriksa atau mengubah reservasi Anda.",
        ),
        "ask_booking_id" => (
            "Please enter your booking code (6 characters, e.g. BUP001).",
            "Silakan masukkan kode booking Anda (6 karakter, contoh: BUP001).",
        ),
        "invalid_code" => (
            "That doesn't look like a valid booking code. It should be 6 letters or digits, e.g. BUP001.",
            "Kode booking tidak valid. Kode terdiri dari 6 huruf atau angka, contoh: BUP001.",
        ),
        "booking_not_found" => (
            "I couldn't find a booking with code {code}. Please check the code and try again.",
            "Booking dengan kode {code} tidak ditemukan. Mohon periksa kembali kode Anda.",
        ),
        "booking_summary" => (
            "Here is your booking:\nCode: {code}\nName: {name}\nEvent: {event}\nDate: {date}\nTime: {time}\nGuests: {adults} adult(s), {children} child(ren)\nStatus: {status}\nPayment: {payment}",
            "Berikut detail booking Anda:\nKode: {code}\nNama: {name}\nAcara: {event}\nTanggal: {date}\nJam: {time}\nTamu: {adults} dewasa, {children} anak\nStatus: {status}\nPembayaran: {payment}",
        ),
        "booking_actions" => (
            "1. Modify this booking\n2. Look up a different code",
            "1. Ubah booking ini\n2. Cari kode lain",
        ),
        "ask_email" => (
            "To verify your identity, please enter the email address used for this booking.",
            "Untuk verifikasi, silakan masukkan alamat email yang digunakan saat booking.",
        ),
        "invalid_email" => (
            "That doesn't look like an email address. Please try again.",
            "Itu bukan alamat email yang valid. Silakan coba lagi.",
        ),
        "ask_phone" => (
            "Thank you. Now please enter the phone number used for this booking.",
            "Terima kasih. Sekarang masukkan nomor telepon yang digunakan saat booking.",
        ),
        "verification_failed" => (
            "The email and phone number don't match our records for this booking. Let's try again — please enter the email address.",
            "Email dan nomor telepon tidak cocok dengan data booking. Mari coba lagi — silakan masukkan alamat email Anda.",
        ),
        "edit_options" => (
            "What would you like to change?\n1. Date\n2. Time\n3. Date and time\n4. Cancel",
            "Apa yang ingin Anda ubah?\n1. Tanggal\n2. Jam\n3. Tanggal dan jam\n4. Batal",
        ),
        "ask_new_date" => (
            "Please enter the new date (DD-MM-YYYY or YYYY-MM-DD).",
            "Silakan masukkan tanggal baru (DD-MM-YYYY atau YYYY-MM-DD).",
        ),
        "ask_new_date_range" => (
            "{event} runs from {start} to {end}.\nPlease enter the new date (DD-MM-YYYY or YYYY-MM-DD).",
            "{event} berlangsung dari {start} sampai {end}.\nSilakan masukkan tanggal baru (DD-MM-YYYY atau YYYY-MM-DD).",
        ),
        "invalid_date" => (
            "I couldn't read that date. Please use DD-MM-YYYY or YYYY-MM-DD.",
            "Tanggal tidak dapat dibaca. Gunakan format DD-MM-YYYY atau YYYY-MM-DD.",
        ),
        "date_in_past" => (
            "That date is in the past. Please choose today or a later date.",
            "Tanggal tersebut sudah lewat. Silakan pilih hari ini atau tanggal setelahnya.",
        ),
        "date_outside_window" => (
            "{event} only runs from {start} to {end}. Please choose a date within that range.",
            "{event} hanya berlangsung dari {start} sampai {end}. Silakan pilih tanggal dalam rentang tersebut.",
        ),
        "date_too_far" => (
            "That date is too far in the future. Please choose a date within the next two years.",
            "Tanggal tersebut terlalu jauh di masa depan. Silakan pilih tanggal dalam dua tahun ke depan.",
        ),
        "date_caveat" => (
            "Note: we couldn't confirm the event schedule, so please double-check this date with our staff.",
            "Catatan: jadwal acara belum dapat kami pastikan, mohon konfirmasi ulang tanggal ini dengan staf kami.",
        ),
        "date_recorded" => (
            "Got it — new date {date} noted.",
            "Baik — tanggal baru {date} dicatat.",
        ),
        "ask_new_time" => (
            "Please enter the new time (HH:MM, 24-hour).",
            "Silakan masukkan jam baru (HH:MM, format 24 jam).",
        ),
        "invalid_time" => (
            "I couldn't read that time. Please use HH:MM, for example 14:30.",
            "Jam tidak dapat dibaca. Gunakan format HH:MM, contoh 14:30.",
        ),
        "time_recorded" => (
            "Got it — new time {time} noted.",
            "Baik — jam baru {time} dicatat.",
        ),
        "continue_editing" => (
            "What next?\n1. Edit the remaining field\n2. Confirm these changes\n3. Discard and exit",
            "Selanjutnya?\n1. Ubah kolom lainnya\n2. Konfirmasi perubahan\n3. Batalkan dan keluar",
        ),
        "confirm_changes" => (
            "Please confirm your changes:\n{changes}\n1. Save\n2. Discard",
            "Silakan konfirmasi perubahan Anda:\n{changes}\n1. Simpan\n2. Batalkan",
        ),
        "new_date_line" => ("- New date: {date}", "- Tanggal baru: {date}"),
        "new_time_line" => ("- New time: {time}", "- Jam baru: {time}"),
        "changes_saved" => (
            "Your booking has been updated.",
            "Booking Anda telah diperbarui.",
        ),
        "changes_discarded" => (
            "No changes were made to your booking.",
            "Tidak ada perubahan pada booking Anda.",
        ),
        "update_failed" => (
            "Sorry, something went wrong while saving your changes. Please try again later.",
            "Maaf, terjadi kesalahan saat menyimpan perubahan. Silakan coba lagi nanti.",
        ),
        "lookup_failed" => (
            "Sorry, something went wrong on our side. Please try again.",
            "Maaf, terjadi kesalahan di sistem kami. Silakan coba lagi.",
        ),
        "cancelled" => (
            "No problem — your booking stays as it is. Have a great day!",
            "Baik — booking Anda tetap seperti semula. Semoga hari Anda menyenangkan!",
        ),
        "ask_more_changes" => (
            "Would you like to change anything else?\n1. Yes\n2. No",
            "Apakah ada lagi yang ingin Anda ubah?\n1. Ya\n2. Tidak",
        ),
        "goodbye" => (
            "Thank you for using Guestdesk! Start a new chat any time you need us.",
            "Terima kasih telah menggunakan Guestdesk! Mulai percakapan baru kapan saja Anda membutuhkan kami.",
        ),
        _ => return None,
    };
    Some(pair)
}

/// Render a catalog message in the given language, substituting
/// `{placeholder}` arguments. Unknown ids render as the key itself.
pub fn render(lang: Language, key: &str, args: &[(&str, &str)]) -> String {
    let template = match catalog(key) {
        Some((en, id)) => match lang {
            Language::En => en,
            Language::Id => id,
        },
        None => {
            tracing::warn!(key, "unknown message id, rendering raw key");
            key
        }
    };

    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
