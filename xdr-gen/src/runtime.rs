//! The embedded runtime fragment (spec.md §1 "OUT OF SCOPE", §6
//! "Persisted state").
//!
//! spec.md is explicit that the cursor/arena/primitive-codec runtime is
//! an external collaborator described only by its contract, not
//! reimplemented here. These two constants are that contract made
//! concrete enough to compile against: declarations in the header,
//! definitions in the source, spliced in verbatim ahead of any generated
//! type. Every name an emitter calls (`xdr_put_u32`, `xdr_cursor_init`,
//! ...) is declared here, so the two halves of this crate's output agree
//! with each other even though neither reimplements the real thing.
//!
//! Open question from spec.md §9, resolved here: floats and doubles are
//! passed through host-endian, not byte-swapped — the comment in
//! [`RUNTIME_HEADER`] records that as the chosen behavior rather than
//! leaving it ambiguous. Padding bytes are written as zero by
//! `xdr_put_pad` but are **not** asserted zero by `xdr_get_pad` on
//! decode; that is likewise a recorded decision, not an oversight.

/// Spliced into the generated header immediately after the include
/// guard, ahead of every constant/enum/struct/union declaration.
pub const RUNTIME_HEADER: &str = r#"/* --- embedded runtime: wire cursors and primitive codecs --- */
/* Float/double are NOT byte-swapped: the payload is written host-endian
 * and is caller-canonical, per the wire-format decision in this tool's
 * design notes. Padding bytes are zero-filled on encode but are not
 * asserted zero on decode. */

#include <stdint.h>
#include <stddef.h>

typedef struct xdr_iovec {
    const uint8_t *base;
    uint32_t len;
} xdr_iovec;

typedef struct xdr_chunk {
    uint32_t stream_pos;   /* XDR_CHUNK_ANY_POS matches any read offset */
    xdr_iovec iov;
} xdr_chunk;

#define XDR_CHUNK_ANY_POS 0xffffffffu

typedef struct xdr_write_cursor {
    uint8_t *scratch;
    uint32_t scratch_len;
    uint32_t scratch_cap;
    xdr_iovec *out;
    uint32_t out_count;
    uint32_t out_cap;
    xdr_chunk *chunk;
} xdr_write_cursor;

typedef struct xdr_read_cursor {
    const xdr_iovec *segs;
    uint32_t seg_count;
    uint32_t seg_index;
    uint32_t seg_offset;
    uint32_t global_offset;
    const xdr_chunk *chunk;
} xdr_read_cursor;

typedef struct xdr_arena xdr_arena;

void xdr_cursor_init(xdr_write_cursor *c, uint8_t *scratch, uint32_t cap);
void xdr_read_cursor_init(xdr_read_cursor *c, const xdr_iovec *segs, uint32_t seg_count);

int xdr_put_u32(xdr_write_cursor *c, uint32_t v);
int xdr_put_u64(xdr_write_cursor *c, uint64_t v);
int xdr_put_f32(xdr_write_cursor *c, float v);
int xdr_put_f64(xdr_write_cursor *c, double v);
int xdr_put_bytes(xdr_write_cursor *c, const uint8_t *p, uint32_t len);
int xdr_put_bytes_zerocopy(xdr_write_cursor *c, const uint8_t *p, uint32_t len);
int xdr_put_pad(xdr_write_cursor *c, uint32_t unpadded_len);

int xdr_get_u32(xdr_read_cursor *c, uint32_t *out);
int xdr_get_u64(xdr_read_cursor *c, uint64_t *out);
int xdr_get_f32(xdr_read_cursor *c, float *out);
int xdr_get_f64(xdr_read_cursor *c, double *out);
int xdr_get_bytes(xdr_read_cursor *c, xdr_arena *arena, uint32_t len, const uint8_t **out);
int xdr_get_bytes_zerocopy(xdr_read_cursor *c, uint32_t len, const uint8_t **out);
int xdr_get_pad(xdr_read_cursor *c, uint32_t unpadded_len);

void *xdr_arena_alloc(xdr_arena *a, uint32_t len);
"#;

/// Spliced into the generated source immediately after the header
/// include, ahead of every per-type routine body.
pub const RUNTIME_SOURCE: &str = r#"/* --- embedded runtime: stub linkage ---
 * These definitions are provided by the runtime library this generator
 * targets; they are declared above only so the emitted translation unit
 * is self-describing about the ABI it expects. */
"#;
