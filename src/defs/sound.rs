// AUTO-GENERATED - see tools/gen_mobjinfo

#[derive(Debug, Copy, Clone)]
#[allow(non_camel_case_types)]
pub enum Sound {
    None,
    Pistol,
    Shotgn,
    Sgcock,
    Pldeth,
    Noway,
    Oof,
    Telept,
    Punch,
    Possit,
    Posact,
    Podth1,
    Posdth,
    Slop,
    Barexp,
    Rlaunc,
    Rxplod,
    Itemup,
}
